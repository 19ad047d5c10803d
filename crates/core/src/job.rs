//! Job identifiers, statuses, and the submission/status wire shapes.
//!
//! The job service owns the status vocabulary, so [`JobStatus`] is an
//! open string. The client only needs to recognise the terminal values:
//! [`STATUS_COMPLETED`] and the failure family (see
//! [`JobStatus::is_failure`]).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Job accepted but not started.
pub const STATUS_PENDING: &str = "pending";
/// Job is being worked on.
pub const STATUS_PROCESSING: &str = "processing";
/// Job finished; the status response carries the result payload.
pub const STATUS_COMPLETED: &str = "completed";
/// Job finished unsuccessfully.
pub const STATUS_FAILED: &str = "failed";
/// Failure prefix used by the service (`"error"` or `"error: <reason>"`).
pub const STATUS_ERROR_PREFIX: &str = "error";

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Status string reported by the job service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStatus(String);

/// Coarse grouping of a status, used for the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Pending,
    Processing,
    Completed,
    Failed,
    Other,
}

impl JobStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn pending() -> Self {
        Self::new(STATUS_PENDING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_completed(&self) -> bool {
        self.0 == STATUS_COMPLETED
    }

    /// `failed`, `error`, or `error: <reason>`.
    pub fn is_failure(&self) -> bool {
        self.0 == STATUS_FAILED
            || self.0 == STATUS_ERROR_PREFIX
            || self.0.starts_with("error:")
    }

    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failure()
    }

    pub fn category(&self) -> StatusCategory {
        match self.0.as_str() {
            STATUS_PENDING => StatusCategory::Pending,
            STATUS_PROCESSING => StatusCategory::Processing,
            STATUS_COMPLETED => StatusCategory::Completed,
            _ if self.is_failure() => StatusCategory::Failed,
            _ => StatusCategory::Other,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl StatusCategory {
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Pending => "pending",
            StatusCategory::Processing => "processing",
            StatusCategory::Completed => "completed",
            StatusCategory::Failed => "failed",
            StatusCategory::Other => "other",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Body of a successful `POST /brief` response.
///
/// The service may name the identifier `brief_id`; both spellings are
/// accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default, alias = "brief_id")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Acknowledgement of an accepted brief. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAck {
    pub job_id: String,
    pub status: JobStatus,
}

impl SubmitResponse {
    /// Convert into an acknowledgement when a non-empty job id is present.
    ///
    /// A missing status is reported as `pending`.
    pub fn into_ack(self) -> Option<SubmissionAck> {
        let job_id = self.job_id.filter(|id| !id.is_empty())?;
        Some(SubmissionAck {
            job_id,
            status: self.status.unwrap_or_else(JobStatus::pending),
        })
    }
}

/// Body of a successful `GET /brief/{job_id}/status` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default, alias = "brief_id")]
    pub job_id: Option<String>,
    pub status: JobStatus,
    /// Completion percentage, when the service reports one.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl StatusResponse {
    /// The result payload, if one is present and not an empty value.
    pub fn result_payload(&self) -> Option<&serde_json::Value> {
        self.result.as_ref().filter(|v| is_present(v))
    }

    /// Progress clamped to `0..=100` and rounded.
    pub fn progress_percent(&self) -> Option<u8> {
        self.progress
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0).round() as u8)
    }
}

/// Whether a JSON value counts as "present" for optional payload parts.
///
/// `null`, `false`, `0` and `""` count as absent.
pub fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
