//! End-to-end tracker scenarios against a scripted job service.
//!
//! All tests run on tokio's paused clock, so scheduled checks fire at
//! exact offsets from the moment the brief is submitted.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use briefcast_client::{BriefApi, HealthStatus, RequestError};
use briefcast_core::{BriefRequest, RawForm, SectionKind, StatusResponse, SubmitResponse};
use briefcast_tracker::{
    JobTracker, MemoryClipboard, NoticeLevel, Phase, TrackerConfig, TrackerError, TrackerEvent,
    TrackerHandle,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Scripted service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Reply {
    Ok(Value),
    Fail(u16, &'static str),
    Slow(Duration, Value),
}

/// Replays scripted replies in order; the last reply repeats forever.
struct ScriptedApi {
    submits: Mutex<VecDeque<Reply>>,
    statuses: Mutex<VecDeque<Reply>>,
    submitted: Mutex<Vec<BriefRequest>>,
    status_calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedApi {
    fn new(submits: Vec<Reply>, statuses: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            submits: Mutex::new(submits.into()),
            statuses: Mutex::new(statuses.into()),
            submitted: Mutex::default(),
            status_calls: Mutex::default(),
        })
    }

    fn next(queue: &Mutex<VecDeque<Reply>>) -> Reply {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().expect("no scripted reply")
        }
    }

    fn submitted(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    fn status_calls(&self) -> Vec<(Instant, String)> {
        self.status_calls.lock().unwrap().clone()
    }
}

async fn play<T: DeserializeOwned>(reply: Reply) -> Result<T, RequestError> {
    match reply {
        Reply::Ok(body) => Ok(serde_json::from_value(body).unwrap()),
        Reply::Slow(delay, body) => {
            tokio::time::sleep(delay).await;
            Ok(serde_json::from_value(body).unwrap())
        }
        Reply::Fail(status, message) => Err(RequestError::Api {
            status,
            message: message.to_string(),
        }),
    }
}

#[async_trait]
impl BriefApi for ScriptedApi {
    async fn submit(&self, request: &BriefRequest) -> Result<SubmitResponse, RequestError> {
        self.submitted.lock().unwrap().push(request.clone());
        play(Self::next(&self.submits)).await
    }

    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse, RequestError> {
        self.status_calls
            .lock()
            .unwrap()
            .push((Instant::now(), job_id.to_string()));
        play(Self::next(&self.statuses)).await
    }

    async fn health(&self) -> Result<HealthStatus, RequestError> {
        play(Reply::Ok(json!({"status": "healthy"}))).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    api: Arc<ScriptedApi>,
    clipboard: Arc<MemoryClipboard>,
    handle: TrackerHandle,
    task: JoinHandle<()>,
    events: broadcast::Receiver<TrackerEvent>,
    start: Instant,
}

fn harness(submits: Vec<Reply>, statuses: Vec<Reply>) -> Harness {
    let api = ScriptedApi::new(submits, statuses);
    let clipboard = Arc::new(MemoryClipboard::new());
    let (handle, task) =
        JobTracker::spawn(api.clone(), TrackerConfig::default(), clipboard.clone());
    let events = handle.subscribe();
    Harness {
        api,
        clipboard,
        handle,
        task,
        events,
        start: Instant::now(),
    }
}

fn ack(job_id: &str) -> Reply {
    Reply::Ok(json!({"job_id": job_id, "status": "pending"}))
}

fn status(value: &str) -> Reply {
    Reply::Ok(json!({"status": value}))
}

fn completed_with_copy() -> Value {
    json!({
        "status": "completed",
        "result": {"copywriter_result": {"hashtags": ["#shoes"]}, "task_id": "abc123"}
    })
}

fn shoes_form() -> RawForm {
    RawForm::new()
        .with("topic", "shoes")
        .with("duration", "")
        .with("tonality", "fun")
        .with("target_audience", "teens")
        .with("platforms", "tiktok")
        .with("platforms", "reels")
}

/// Wait (on the paused clock) for the first event matching `pred`.
async fn wait_for<F>(events: &mut broadcast::Receiver<TrackerEvent>, mut pred: F) -> TrackerEvent
where
    F: FnMut(&TrackerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            match events.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(e) => panic!("tracker event stream ended: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for tracker event")
}

/// Everything already queued on the receiver.
fn drain(events: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

async fn sleep_to(start: Instant, ms: u64) {
    tokio::time::sleep_until(start + Duration::from_millis(ms)).await;
}

/// Check call offsets from `start`, allowing for timer granularity.
fn assert_offsets(start: Instant, calls: &[(Instant, String)], expected: &[u64]) {
    let actual: Vec<u64> = calls
        .iter()
        .map(|(at, _)| (*at - start).as_millis() as u64)
        .collect();
    assert_eq!(actual.len(), expected.len(), "calls at {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.abs_diff(*e) <= 5, "calls at {actual:?}, expected {expected:?}");
    }
}

fn assert_elapsed(since: Instant, expected: Duration) {
    let elapsed = Instant::now() - since;
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "elapsed {elapsed:?}, expected {expected:?}"
    );
}

fn is_status(event: &TrackerEvent, job: &str, value: &str) -> bool {
    matches!(event, TrackerEvent::StatusChanged { job_id, status, .. }
        if job_id == job && status.as_str() == value)
}

// ---------------------------------------------------------------------------
// Submission and scheduling
// ---------------------------------------------------------------------------

/// A fresh tracker is idle with nothing scheduled.
#[tokio::test(start_paused = true)]
async fn test_fresh_tracker_is_idle() {
    let h = harness(vec![ack("abc123")], vec![status("pending")]);

    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.job_id.is_none());
    assert!(snapshot.fragments.is_empty());

    h.handle.check_status().unwrap();
    sleep_to(h.start, 10_000).await;
    assert!(h.api.status_calls().is_empty());
}

/// An accepted brief moves to Tracking, shows "pending" and schedules the
/// first check two seconds later, then every five.
#[tokio::test(start_paused = true)]
async fn test_accepted_brief_starts_tracking() {
    let mut h = harness(vec![ack("abc123")], vec![status("processing")]);

    h.handle.submit(shoes_form()).unwrap();
    let event = wait_for(&mut h.events, |e| matches!(e, TrackerEvent::StatusChanged { .. })).await;
    assert_matches!(
        event,
        TrackerEvent::StatusChanged { job_id, status, progress: None, .. }
            if job_id == "abc123" && status.as_str() == "pending"
    );

    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Tracking);
    assert_eq!(snapshot.job_id.as_deref(), Some("abc123"));

    let submitted = h.api.submitted.lock().unwrap()[0].clone();
    assert_eq!(submitted.duration, 60);
    assert_eq!(submitted.platforms, vec!["tiktok", "reels"]);

    sleep_to(h.start, 1_900).await;
    assert!(h.api.status_calls().is_empty());

    sleep_to(h.start, 10_100).await;
    assert_offsets(h.start, &h.api.status_calls(), &[2_000, 5_000, 10_000]);
}

/// A submission failure surfaces the service detail and never polls.
#[tokio::test(start_paused = true)]
async fn test_submit_failure_shows_detail_and_returns_to_idle() {
    let mut h = harness(vec![Reply::Fail(500, "overloaded")], vec![status("pending")]);

    h.handle.submit(shoes_form()).unwrap();
    let event = wait_for(&mut h.events, |e| matches!(e, TrackerEvent::Notice(_))).await;
    assert_matches!(
        event,
        TrackerEvent::Notice(notice) if notice.message == "overloaded" && notice.level == NoticeLevel::Error
    );

    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.job_id.is_none());

    sleep_to(h.start, 20_000).await;
    assert!(h.api.status_calls().is_empty());
}

/// An acknowledgement without a job id does not start tracking.
#[tokio::test(start_paused = true)]
async fn test_ack_without_job_id_returns_to_idle() {
    let mut h = harness(
        vec![Reply::Ok(json!({"status": "pending"}))],
        vec![status("pending")],
    );

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::Notice(_))).await;

    assert_eq!(h.handle.snapshot().phase, Phase::Idle);
    sleep_to(h.start, 10_000).await;
    assert!(h.api.status_calls().is_empty());
}

/// Submitting again while the first submission is in flight is ignored.
#[tokio::test(start_paused = true)]
async fn test_submit_is_ignored_while_submitting() {
    let mut h = harness(
        vec![Reply::Slow(
            Duration::from_secs(1),
            json!({"job_id": "abc123", "status": "pending"}),
        )],
        vec![status("pending")],
    );

    h.handle.submit(shoes_form()).unwrap();
    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "abc123", "pending")).await;

    assert_eq!(h.api.submitted(), 1);
}

// ---------------------------------------------------------------------------
// Terminal states
// ---------------------------------------------------------------------------

/// A completed status with a result stops polling and renders exactly
/// one fragment for the single present section.
#[tokio::test(start_paused = true)]
async fn test_completed_result_renders_and_stops_polling() {
    let mut h = harness(
        vec![ack("abc123")],
        vec![status("processing"), Reply::Ok(completed_with_copy())],
    );

    h.handle.submit(shoes_form()).unwrap();
    let event = wait_for(&mut h.events, |e| matches!(e, TrackerEvent::ResultsRendered { .. })).await;
    let TrackerEvent::ResultsRendered { job_id, fragments } = event else {
        unreachable!()
    };
    assert_eq!(job_id, "abc123");
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].kind, SectionKind::Copy);
    assert!(fragments[0].copyable);

    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::PhaseChanged { phase: Phase::Idle })).await;
    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.fragments.len(), 1);
    assert_eq!(snapshot.status.map(|s| s.to_string()).as_deref(), Some("completed"));

    sleep_to(h.start, 30_000).await;
    assert_eq!(h.api.status_calls().len(), 2);
}

/// A completed status without a result keeps polling; nothing renders.
#[tokio::test(start_paused = true)]
async fn test_completed_without_result_keeps_polling() {
    let mut h = harness(vec![ack("abc123")], vec![status("completed")]);

    h.handle.submit(shoes_form()).unwrap();
    sleep_to(h.start, 15_100).await;

    assert_eq!(h.api.status_calls().len(), 4);
    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.phase, Phase::Tracking);
    assert!(snapshot.fragments.is_empty());

    let events = drain(&mut h.events);
    assert!(!events
        .iter()
        .any(|e| matches!(e, TrackerEvent::ResultsRendered { .. })));
    let completed = events
        .iter()
        .filter(|e| is_status(e, "abc123", "completed"))
        .count();
    assert_eq!(completed, 1);
}

/// A failure status stops polling and raises an error notice.
#[tokio::test(start_paused = true)]
async fn test_failure_status_is_terminal() {
    let mut h = harness(vec![ack("abc123")], vec![status("error: model unavailable")]);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::PhaseChanged { phase: Phase::Failed })).await;
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::PhaseChanged { phase: Phase::Idle })).await;

    let snapshot = h.handle.snapshot();
    let notice = snapshot.error_notice.expect("error notice");
    assert!(notice.message.contains("model unavailable"), "{}", notice.message);

    sleep_to(h.start, 30_000).await;
    assert_eq!(h.api.status_calls().len(), 1);
}

/// A failed status check raises a notice but tracking continues.
#[tokio::test(start_paused = true)]
async fn test_fetch_error_keeps_tracking() {
    let mut h = harness(
        vec![ack("abc123")],
        vec![Reply::Fail(503, "HTTP 503"), status("processing")],
    );

    h.handle.submit(shoes_form()).unwrap();
    let event = wait_for(&mut h.events, |e| matches!(e, TrackerEvent::Notice(_))).await;
    assert_matches!(event, TrackerEvent::Notice(notice) if notice.message == "HTTP 503");
    assert_eq!(h.handle.snapshot().phase, Phase::Tracking);

    wait_for(&mut h.events, |e| is_status(e, "abc123", "processing")).await;
    assert_eq!(h.handle.snapshot().phase, Phase::Tracking);
}

// ---------------------------------------------------------------------------
// Manual checks and superseded sessions
// ---------------------------------------------------------------------------

/// Two immediate manual checks on a completed job render once.
#[tokio::test(start_paused = true)]
async fn test_double_manual_check_renders_once() {
    let mut h = harness(vec![ack("abc123")], vec![Reply::Ok(completed_with_copy())]);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "abc123", "pending")).await;

    h.handle.check_status().unwrap();
    h.handle.check_status().unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::ResultsRendered { .. })).await;
    sleep_to(h.start, 1_000).await;

    assert_eq!(h.api.status_calls().len(), 2);
    let rest = drain(&mut h.events);
    assert!(!rest
        .iter()
        .any(|e| matches!(e, TrackerEvent::ResultsRendered { .. } | TrackerEvent::StatusChanged { .. })));
    assert_eq!(h.handle.snapshot().fragments.len(), 1);
}

/// Two immediate manual checks with an unchanged status report it once.
#[tokio::test(start_paused = true)]
async fn test_double_manual_check_keeps_status_unchanged() {
    let mut h = harness(vec![ack("abc123")], vec![status("processing")]);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "abc123", "pending")).await;

    h.handle.check_status().unwrap();
    h.handle.check_status().unwrap();
    sleep_to(h.start, 1_000).await;

    let changes = drain(&mut h.events)
        .iter()
        .filter(|e| matches!(e, TrackerEvent::StatusChanged { .. }))
        .count();
    assert_eq!(changes, 1);
    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.status.map(|s| s.to_string()).as_deref(), Some("processing"));
    assert_eq!(snapshot.phase, Phase::Tracking);
}

/// A new submission stops the previous session's checks.
#[tokio::test(start_paused = true)]
async fn test_new_submission_replaces_polling_session() {
    let mut h = harness(vec![ack("abc123"), ack("def456")], vec![status("processing")]);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "abc123", "pending")).await;

    sleep_to(h.start, 1_000).await;
    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "def456", "pending")).await;

    sleep_to(h.start, 12_000).await;
    let calls = h.api.status_calls();
    assert!(calls.iter().all(|(_, job)| job == "def456"), "{calls:?}");
    assert_offsets(h.start, &calls, &[3_000, 6_000, 11_000]);
}

/// A new submission clears previously rendered results.
#[tokio::test(start_paused = true)]
async fn test_new_submission_clears_results() {
    let mut h = harness(
        vec![ack("abc123"), ack("def456")],
        vec![Reply::Ok(completed_with_copy())],
    );

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::ResultsRendered { .. })).await;
    assert_eq!(h.handle.snapshot().fragments.len(), 1);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::ResultsCleared)).await;
    assert!(h.handle.snapshot().fragments.is_empty());

    wait_for(&mut h.events, |e| is_status(e, "def456", "pending")).await;
    assert_eq!(h.handle.snapshot().job_id.as_deref(), Some("def456"));
}

/// A slow status reply for a superseded job is discarded.
#[tokio::test(start_paused = true)]
async fn test_stale_completion_is_discarded() {
    let mut h = harness(
        vec![ack("abc123"), ack("def456")],
        vec![
            Reply::Slow(Duration::from_secs(4), completed_with_copy()),
            status("processing"),
        ],
    );

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "abc123", "pending")).await;

    // The first check is issued at 2s and answers at 6s.
    sleep_to(h.start, 3_000).await;
    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "def456", "pending")).await;

    sleep_to(h.start, 7_000).await;
    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.job_id.as_deref(), Some("def456"));
    assert_eq!(snapshot.phase, Phase::Tracking);
    assert!(snapshot.fragments.is_empty());
    assert!(!drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, TrackerEvent::ResultsRendered { .. })));
}

// ---------------------------------------------------------------------------
// Notices and copy
// ---------------------------------------------------------------------------

/// Error notices disappear after five seconds.
#[tokio::test(start_paused = true)]
async fn test_error_notice_expires() {
    let mut h = harness(vec![Reply::Fail(500, "overloaded")], vec![status("pending")]);

    h.handle.submit(shoes_form()).unwrap();
    let TrackerEvent::Notice(notice) =
        wait_for(&mut h.events, |e| matches!(e, TrackerEvent::Notice(_))).await
    else {
        unreachable!()
    };
    let shown_at = Instant::now();

    let dismissed = wait_for(&mut h.events, |e| matches!(e, TrackerEvent::NoticeDismissed { .. })).await;
    assert_matches!(dismissed, TrackerEvent::NoticeDismissed { id } if id == notice.id);
    assert_elapsed(shown_at, Duration::from_secs(5));
    assert!(h.handle.snapshot().error_notice.is_none());
}

/// Editing the form hides the error notice right away.
#[tokio::test(start_paused = true)]
async fn test_form_edit_dismisses_error() {
    let mut h = harness(vec![Reply::Fail(500, "overloaded")], vec![status("pending")]);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::Notice(_))).await;
    let edited_at = Instant::now();

    h.handle.form_edited().unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::NoticeDismissed { .. })).await;

    assert!(Instant::now() - edited_at < Duration::from_secs(1));
    assert!(h.handle.snapshot().error_notice.is_none());
}

/// Copying a rendered fragment writes its text and confirms for 3s.
#[tokio::test(start_paused = true)]
async fn test_copy_writes_fragment_text() {
    let mut h = harness(vec![ack("abc123")], vec![Reply::Ok(completed_with_copy())]);

    h.handle.submit(shoes_form()).unwrap();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::ResultsRendered { .. })).await;

    h.handle.copy(0).unwrap();
    let TrackerEvent::Notice(notice) =
        wait_for(&mut h.events, |e| matches!(e, TrackerEvent::Notice(_))).await
    else {
        unreachable!()
    };
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(notice.message, "Copied to clipboard!");
    assert_eq!(h.clipboard.last().as_deref(), Some("Hashtags\n- #shoes"));

    let copied_at = Instant::now();
    wait_for(&mut h.events, |e| matches!(e, TrackerEvent::NoticeDismissed { .. })).await;
    assert_elapsed(copied_at, Duration::from_secs(3));

    h.handle.copy(7).unwrap();
    sleep_to(copied_at, 10_000).await;
    assert_eq!(h.clipboard.writes().len(), 1);
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// After shutdown the task ends and commands are rejected.
#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_task() {
    let h = harness(vec![ack("abc123")], vec![status("processing")]);

    h.handle.shutdown().unwrap();
    h.task.await.unwrap();

    assert_matches!(h.handle.submit(shoes_form()), Err(TrackerError::Stopped));
}
