//! Transient user-facing notices.
//!
//! The surface has one slot per [`NoticeLevel`]: raising a notice
//! replaces the visible one of the same level. Expiry is driven by the
//! tracker, which schedules an expiry message per notice and calls
//! [`NotificationSurface::expire`] with the notice id.

use std::time::Duration;

use briefcast_core::types::Timestamp;
use serde::Serialize;

use crate::config::NoticeConfig;

/// Confirmation text raised after a successful copy.
pub const COPIED_MESSAGE: &str = "Copied to clipboard!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Info,
}

/// One visible notice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug)]
pub struct NotificationSurface {
    config: NoticeConfig,
    next_id: u64,
    error: Option<Notice>,
    info: Option<Notice>,
}

impl NotificationSurface {
    pub fn new(config: NoticeConfig) -> Self {
        Self {
            config,
            next_id: 1,
            error: None,
            info: None,
        }
    }

    /// Show an error notice, replacing any visible error.
    pub fn raise_error(&mut self, message: impl Into<String>) -> Notice {
        let notice = self.build(NoticeLevel::Error, message.into(), self.config.error_ttl);
        self.error = Some(notice.clone());
        notice
    }

    /// Show an info notice, replacing any visible info notice.
    pub fn raise_info(&mut self, message: impl Into<String>) -> Notice {
        let notice = self.build(NoticeLevel::Info, message.into(), self.config.info_ttl);
        self.info = Some(notice.clone());
        notice
    }

    /// How long a notice of `level` stays visible.
    pub fn ttl(&self, level: NoticeLevel) -> Duration {
        match level {
            NoticeLevel::Error => self.config.error_ttl,
            NoticeLevel::Info => self.config.info_ttl,
        }
    }

    /// Hide the visible error notice. Returns it if there was one.
    pub fn dismiss_error(&mut self) -> Option<Notice> {
        self.error.take()
    }

    /// Hide the notice with `id` if it is still the visible one.
    ///
    /// A notice that has already been replaced is left alone, so an
    /// expiry scheduled for an older notice never hides a newer one.
    pub fn expire(&mut self, id: u64) -> Option<Notice> {
        for slot in [&mut self.error, &mut self.info] {
            if slot.as_ref().is_some_and(|n| n.id == id) {
                return slot.take();
            }
        }
        None
    }

    pub fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    pub fn info(&self) -> Option<&Notice> {
        self.info.as_ref()
    }

    fn build(&mut self, level: NoticeLevel, message: String, ttl: Duration) -> Notice {
        let id = self.next_id;
        self.next_id += 1;

        let created_at = chrono::Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(created_at);

        tracing::debug!(id, ?level, message = %message, "Raising notice");

        Notice {
            id,
            level,
            message,
            created_at,
            expires_at,
        }
    }
}
