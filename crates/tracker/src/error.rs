/// Errors returned by [`TrackerHandle`](crate::TrackerHandle) operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The tracker task has exited; the command was not delivered.
    #[error("Job tracker is not running")]
    Stopped,
}
