/// How a task executes, decided by what its runner returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Value, failure or future: settled at construction, `cancel()` is a no-op.
    Immediate,
    /// Stepper: driven one step per scheduling turn, `cancel()` interrupts it.
    Stepped,
}

/// Lifecycle of a task.
///
/// ```text
/// Stepping ──► Suspended ──► Stepping ──► ...
///     │                          │
///     └──► Finished | Failed ◄───┘
/// ```
///
/// Immediate tasks are `Finished` or `Failed` as soon as they are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// A step is running.
    Stepping,
    /// Waiting for the next scheduled step.
    Suspended,
    /// Result resolved, or locked onto a future to adopt.
    ///
    /// An adopted future may still be running (and may still reject); only the
    /// settlement channel reports its outcome.
    Finished,
    /// Result rejected.
    Failed,
}

impl TaskState {
    /// `Finished` and `Failed` are terminal.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Finished | TaskState::Failed)
    }
}
