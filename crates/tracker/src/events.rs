//! Events and state snapshots published by the job tracker.
//!
//! Events are broadcast as they happen; the snapshot is the current
//! display state and is replaced after every processed command.

use briefcast_core::{Fragment, JobStatus, StatusCategory};
use serde::Serialize;

use crate::notice::Notice;

/// Lifecycle phase of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No active job.
    Idle,
    /// Brief sent, waiting for the acknowledgement.
    Submitting,
    /// Job acknowledged; status checks are scheduled.
    Tracking,
    /// Completed result is being turned into fragments.
    Rendering,
    /// Job reported a failure status.
    Failed,
}

/// A display-level change produced by the tracker.
#[derive(Debug, Clone, Serialize)]
pub enum TrackerEvent {
    PhaseChanged { phase: Phase },

    /// The displayed status changed (text, badge or progress).
    StatusChanged {
        job_id: String,
        status: JobStatus,
        category: StatusCategory,
        /// Completion percentage (0-100), when reported.
        progress: Option<u8>,
    },

    /// Previously rendered results were removed.
    ResultsCleared,

    /// A completed job's result was rendered.
    ResultsRendered {
        job_id: String,
        fragments: Vec<Fragment>,
    },

    Notice(Notice),

    /// The notice with `id` is no longer visible.
    NoticeDismissed { id: u64 },
}

/// Current display state of the tracker.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerSnapshot {
    pub phase: Phase,
    pub job_id: Option<String>,
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub fragments: Vec<Fragment>,
    pub error_notice: Option<Notice>,
    pub info_notice: Option<Notice>,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            job_id: None,
            status: None,
            progress: None,
            fragments: Vec::new(),
            error_notice: None,
            info_notice: None,
        }
    }
}
