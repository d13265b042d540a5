//! Runtime core: task handle, step driver and scheduling.
//!
//! Public API from this module is [`Task`] (with [`TaskBuilder`]), the scheduling
//! seam ([`Schedule`]) and [`Monitor`], which wires tasks to subscribers.
//!
//! Internal modules:
//! - [`task`]: runner invocation and mode selection;
//! - [`driver`]: one step per turn, cancellation delivery;
//! - [`settle`]: the single settlement channel;
//! - [`scheduler`]: next-turn scheduling (tokio or a manual turn queue);
//! - [`probe`]: event publishing for one task;
//! - [`monitor`]: bus listener and subscriber fan-out.

mod builder;
mod config;
mod driver;
mod monitor;
mod probe;
mod scheduler;
mod settle;
mod state;
mod task;

pub use builder::TaskBuilder;
pub use config::Config;
pub use monitor::Monitor;
pub use scheduler::{Job, Schedule, SchedulerRef, TokioScheduler, TurnQueue};
pub use settle::TaskResult;
pub use state::{Mode, TaskState};
pub use task::{Canceller, Task};
