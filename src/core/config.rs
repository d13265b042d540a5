//! # Configuration.
//!
//! Provides [`Config`], settings shared by a [`Monitor`](crate::Monitor) and the tasks it
//! builds.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]

/// Settings for event publishing.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `publish_steps`: Publish `StepSuspended` once per suspension point
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Whether stepped tasks publish `StepSuspended` events.
    ///
    /// Off by default: a long computation emits one per suspension point.
    pub publish_steps: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `publish_steps = false`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            publish_steps: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(Config::default().bus_capacity_clamped(), 1024);
        assert!(!Config::default().publish_steps);
    }
}
