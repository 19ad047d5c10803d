//! Job tracking state machine.
//!
//! [`JobTracker`] runs as one task that owns every piece of mutable
//! state: the phase, the tracked job, the polling session, the rendered
//! fragments and the visible notices. User commands, scheduled ticks and
//! network completions all arrive through the same mailbox and are
//! handled one at a time.
//!
//! Network calls run in spawned tasks. Each call is tagged with the
//! session epoch that issued it; a completion whose epoch is no longer
//! current (a newer submission started meanwhile) is discarded.
//!
//! ```text
//! Idle -> Submitting -> Tracking -> Rendering -> Idle
//!                  \            \-> Failed ----> Idle
//!                   \-> Idle (submission error)
//! ```

use std::sync::Arc;

use briefcast_client::{BriefApi, RequestError};
use briefcast_core::{
    attach_copy_affordances, extract, render, JobResult, JobStatus, RawForm, StatusResponse,
    SubmitResponse,
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::clipboard::Clipboard;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::events::{Phase, TrackerEvent, TrackerSnapshot};
use crate::notice::{Notice, NotificationSurface, COPIED_MESSAGE};
use crate::scheduler::PollingScheduler;

/// Broadcast channel capacity for tracker events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckOrigin {
    /// User-triggered check.
    Manual,
    /// Scheduled tick issued by the session with this epoch.
    Tick { epoch: u64 },
}

#[derive(Debug)]
enum Command {
    Submit(RawForm),
    CheckStatus(CheckOrigin),
    Copy(usize),
    FormEdited,
    SubmitFinished {
        epoch: u64,
        result: Result<SubmitResponse, RequestError>,
    },
    StatusFetched {
        epoch: u64,
        job_id: String,
        result: Result<StatusResponse, RequestError>,
    },
    NoticeExpired {
        id: u64,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable handle to a running [`JobTracker`].
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<TrackerEvent>,
    snapshot: watch::Receiver<TrackerSnapshot>,
}

impl TrackerHandle {
    /// Submit a new brief. Supersedes any job currently tracked.
    pub fn submit(&self, form: RawForm) -> Result<(), TrackerError> {
        self.send(Command::Submit(form))
    }

    /// Check the tracked job's status now, outside the schedule.
    pub fn check_status(&self) -> Result<(), TrackerError> {
        self.send(Command::CheckStatus(CheckOrigin::Manual))
    }

    /// Copy the text of the rendered fragment at `index`.
    pub fn copy(&self, index: usize) -> Result<(), TrackerError> {
        self.send(Command::Copy(index))
    }

    /// The submission form was edited; hides the visible error notice.
    pub fn form_edited(&self) -> Result<(), TrackerError> {
        self.send(Command::FormEdited)
    }

    /// Stop polling and end the tracker task.
    pub fn shutdown(&self) -> Result<(), TrackerError> {
        self.send(Command::Shutdown)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// Current display state.
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch channel that changes whenever the display state does.
    pub fn watch(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshot.clone()
    }

    fn send(&self, command: Command) -> Result<(), TrackerError> {
        self.commands.send(command).map_err(|_| TrackerError::Stopped)
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// The job currently shown to the user.
#[derive(Debug, Clone)]
struct TrackedJob {
    job_id: String,
    status: JobStatus,
    progress: Option<u8>,
}

pub struct JobTracker {
    api: Arc<dyn BriefApi>,
    clipboard: Arc<dyn Clipboard>,
    scheduler: PollingScheduler,
    notices: NotificationSurface,
    mailbox: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<TrackerEvent>,
    snapshot: watch::Sender<TrackerSnapshot>,
    phase: Phase,
    /// Bumped on every submission; tags ticks and network completions.
    epoch: u64,
    job: Option<TrackedJob>,
    fragments: Vec<briefcast_core::Fragment>,
}

impl JobTracker {
    /// Start the tracker task in the `Idle` phase.
    ///
    /// Must be called from within a tokio runtime. The task runs until
    /// [`TrackerHandle::shutdown`] is called.
    pub fn spawn(
        api: Arc<dyn BriefApi>,
        config: TrackerConfig,
        clipboard: Arc<dyn Clipboard>,
    ) -> (TrackerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(TrackerSnapshot::default());

        let tracker = Self {
            api,
            clipboard,
            scheduler: PollingScheduler::new(config.polling),
            notices: NotificationSurface::new(config.notices),
            mailbox: command_tx.clone(),
            events: event_tx.clone(),
            snapshot: snapshot_tx,
            phase: Phase::Idle,
            epoch: 0,
            job: None,
            fragments: Vec::new(),
        };

        let handle = TrackerHandle {
            commands: command_tx,
            events: event_tx,
            snapshot: snapshot_rx,
        };

        let task = tokio::spawn(tracker.run(command_rx));
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("Job tracker started");

        while let Some(command) = commands.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle(command);
            self.publish();
        }

        self.scheduler.stop();
        tracing::info!("Job tracker stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Submit(form) => self.on_submit(form),
            Command::CheckStatus(origin) => self.on_check_status(origin),
            Command::Copy(index) => self.on_copy(index),
            Command::FormEdited => self.on_form_edited(),
            Command::SubmitFinished { epoch, result } => self.on_submit_finished(epoch, result),
            Command::StatusFetched {
                epoch,
                job_id,
                result,
            } => self.on_status_fetched(epoch, job_id, result),
            Command::NoticeExpired { id } => {
                if self.notices.expire(id).is_some() {
                    self.emit(TrackerEvent::NoticeDismissed { id });
                }
            }
            Command::Shutdown => {}
        }
    }

    // ---- submission ----

    fn on_submit(&mut self, form: RawForm) {
        if self.phase == Phase::Submitting {
            tracing::debug!("Submission already in progress, ignoring submit");
            return;
        }

        self.scheduler.stop();
        self.epoch += 1;
        self.job = None;
        if !self.fragments.is_empty() {
            self.fragments.clear();
            self.emit(TrackerEvent::ResultsCleared);
        }
        self.on_form_edited();

        let request = extract(&form);
        if let Err(e) = request.ensure_valid() {
            tracing::warn!(error = %e, "Extracted brief failed validation");
        }

        tracing::info!(
            epoch = self.epoch,
            topic = request.topic.as_deref().unwrap_or(""),
            duration = request.duration,
            platforms = ?request.platforms,
            "Submitting brief",
        );
        self.set_phase(Phase::Submitting);

        let api = Arc::clone(&self.api);
        let mailbox = self.mailbox.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = api.submit(&request).await;
            let _ = mailbox.send(Command::SubmitFinished { epoch, result });
        });
    }

    fn on_submit_finished(&mut self, epoch: u64, result: Result<SubmitResponse, RequestError>) {
        if epoch != self.epoch || self.phase != Phase::Submitting {
            tracing::debug!(epoch, current = self.epoch, "Discarding stale submission result");
            return;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Brief submission failed");
                self.raise_error(e.to_string());
                self.set_phase(Phase::Idle);
                return;
            }
        };

        let Some(ack) = response.into_ack() else {
            tracing::warn!("Submission accepted without a job id");
            self.raise_error("The service did not return a job id");
            self.set_phase(Phase::Idle);
            return;
        };

        tracing::info!(job_id = %ack.job_id, status = %ack.status, "Brief accepted");

        self.job = Some(TrackedJob {
            job_id: ack.job_id.clone(),
            status: ack.status.clone(),
            progress: None,
        });
        self.set_phase(Phase::Tracking);
        self.emit_status();

        let mailbox = self.mailbox.clone();
        self.scheduler.start(ack.job_id, move || {
            let _ = mailbox.send(Command::CheckStatus(CheckOrigin::Tick { epoch }));
        });
    }

    // ---- status checks ----

    fn on_check_status(&mut self, origin: CheckOrigin) {
        if let CheckOrigin::Tick { epoch } = origin {
            if epoch != self.epoch {
                tracing::debug!(epoch, current = self.epoch, "Discarding stale tick");
                return;
            }
        }

        let job_id = match (&self.job, self.phase) {
            (Some(job), Phase::Tracking) => job.job_id.clone(),
            _ => {
                tracing::debug!(phase = ?self.phase, ?origin, "No job being tracked, skipping check");
                return;
            }
        };

        tracing::debug!(job_id = %job_id, ?origin, "Checking job status");

        let api = Arc::clone(&self.api);
        let mailbox = self.mailbox.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = api.fetch_status(&job_id).await;
            let _ = mailbox.send(Command::StatusFetched {
                epoch,
                job_id,
                result,
            });
        });
    }

    fn on_status_fetched(
        &mut self,
        epoch: u64,
        job_id: String,
        result: Result<StatusResponse, RequestError>,
    ) {
        let current = self.job.as_ref().map(|j| j.job_id.as_str());
        if epoch != self.epoch || self.phase != Phase::Tracking || current != Some(job_id.as_str())
        {
            tracing::debug!(job_id = %job_id, epoch, "Discarding stale status result");
            return;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Status check failed");
                self.raise_error(e.to_string());
                return;
            }
        };

        self.update_status(&response);

        if response.status.is_completed() {
            match response.result_payload() {
                Some(payload) => self.finish_with_result(job_id, payload),
                None => tracing::warn!(
                    job_id = %job_id,
                    "Job completed without a result payload, polling continues",
                ),
            }
        } else if response.status.is_failure() {
            self.scheduler.stop();
            tracing::warn!(job_id = %job_id, status = %response.status, "Job failed");
            self.raise_error(format!("Job failed: {}", response.status));
            self.set_phase(Phase::Failed);
            self.set_phase(Phase::Idle);
        }
    }

    fn update_status(&mut self, response: &StatusResponse) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let progress = response.progress_percent().or(job.progress);
        if job.status == response.status && job.progress == progress {
            return;
        }
        job.status = response.status.clone();
        job.progress = progress;
        self.emit_status();
    }

    fn finish_with_result(&mut self, job_id: String, payload: &serde_json::Value) {
        self.scheduler.stop();
        self.set_phase(Phase::Rendering);

        let result = JobResult::from_value(payload);
        let unknown = result.unknown_keys();
        if !unknown.is_empty() {
            tracing::debug!(job_id = %job_id, keys = ?unknown, "Ignoring unrecognised result keys");
        }

        let mut fragments = render(&result);
        attach_copy_affordances(&mut fragments);
        if fragments.is_empty() {
            tracing::warn!(job_id = %job_id, "Completed result has no recognised sections");
        }
        tracing::info!(job_id = %job_id, fragments = fragments.len(), "Job result rendered");

        self.fragments = fragments.clone();
        self.emit(TrackerEvent::ResultsRendered { job_id, fragments });
        self.set_phase(Phase::Idle);
    }

    // ---- copy / notices ----

    fn on_copy(&mut self, index: usize) {
        let Some(fragment) = self.fragments.get(index) else {
            tracing::debug!(index, "No fragment to copy");
            return;
        };
        if !fragment.copyable {
            tracing::debug!(index, section = fragment.kind.key(), "Fragment is not copyable");
            return;
        }

        match self.clipboard.write_text(&fragment.text()) {
            Ok(()) => {
                let notice = self.notices.raise_info(COPIED_MESSAGE);
                self.show(notice);
            }
            Err(e) => tracing::warn!(index, error = %e, "Copy to clipboard failed"),
        }
    }

    fn on_form_edited(&mut self) {
        if let Some(notice) = self.notices.dismiss_error() {
            self.emit(TrackerEvent::NoticeDismissed { id: notice.id });
        }
    }

    fn raise_error(&mut self, message: impl Into<String>) {
        let notice = self.notices.raise_error(message);
        self.show(notice);
    }

    /// Emit `notice` and schedule its expiry.
    fn show(&mut self, notice: Notice) {
        let ttl = self.notices.ttl(notice.level);
        let id = notice.id;
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = mailbox.send(Command::NoticeExpired { id });
        });
        self.emit(TrackerEvent::Notice(notice));
    }

    // ---- publishing ----

    fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        tracing::debug!(from = ?self.phase, to = ?phase, "Tracker phase changed");
        self.phase = phase;
        self.emit(TrackerEvent::PhaseChanged { phase });
    }

    fn emit_status(&self) {
        if let Some(job) = &self.job {
            self.emit(TrackerEvent::StatusChanged {
                job_id: job.job_id.clone(),
                status: job.status.clone(),
                category: job.status.category(),
                progress: job.progress,
            });
        }
    }

    fn emit(&self, event: TrackerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        self.snapshot.send_replace(TrackerSnapshot {
            phase: self.phase,
            job_id: self.job.as_ref().map(|j| j.job_id.clone()),
            status: self.job.as_ref().map(|j| j.status.clone()),
            progress: self.job.as_ref().and_then(|j| j.progress),
            fragments: self.fragments.clone(),
            error_notice: self.notices.error().cloned(),
            info_notice: self.notices.info().cloned(),
        });
    }
}
