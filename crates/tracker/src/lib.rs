//! Job tracking for submitted briefs.
//!
//! [`JobTracker`] owns the whole client-side lifecycle of one brief:
//! submission, periodic status checks through the [`PollingScheduler`],
//! rendering of the completed result, and transient notices. It runs as a
//! single task; callers talk to it through a cloneable [`TrackerHandle`]
//! and observe it through [`TrackerEvent`]s and [`TrackerSnapshot`]s.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod events;
pub mod notice;
pub mod scheduler;
pub mod tracker;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use config::{NoticeConfig, PollingConfig, TrackerConfig};
pub use error::TrackerError;
pub use events::{Phase, TrackerEvent, TrackerSnapshot};
pub use notice::{Notice, NoticeLevel, NotificationSurface};
pub use scheduler::PollingScheduler;
pub use tracker::{JobTracker, TrackerHandle};
