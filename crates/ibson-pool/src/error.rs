/// Errors surfaced by [`WorkerPool`](crate::WorkerPool) to task callers.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The handler panicked while running this task. The worker that ran it
    /// has been replaced; other tasks are unaffected.
    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// The pool was closed before the task could be submitted.
    #[error("worker pool is closed")]
    Closed,

    /// The task was accepted but its result will never arrive, e.g. the
    /// last worker exited without picking it up.
    #[error("task was dropped before completing")]
    Cancelled,

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
