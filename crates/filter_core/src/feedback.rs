//! Transient, auto-dismissing confirmations shown after apply/reset.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use tracing::info;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn color(self) -> &'static str {
        match self {
            NoticeKind::Success => "#28a745",
            NoticeKind::Info => "#17a2b8",
            NoticeKind::Warning => "#ffc107",
            NoticeKind::Error => "#dc3545",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn show(&self, notice: Notice);
}

struct ShownNotice {
    notice: Notice,
    expires_at: Instant,
}

/// Holds the single visible notice; a newer notice replaces the older one and each hides
/// itself once its ttl has elapsed.
pub struct NoticeBoard {
    ttl: Duration,
    current: Mutex<Option<ShownNotice>>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: Mutex::new(None),
        }
    }

    pub fn show_at(&self, notice: Notice, now: Instant) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = Some(ShownNotice {
            notice,
            expires_at: now + self.ttl,
        });
    }

    /// Notice still on screen at `now`, if any.
    pub fn visible_at(&self, now: Instant) -> Option<Notice> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some(shown) if now < shown.expires_at => Some(shown.notice.clone()),
            Some(_) => {
                *current = None;
                None
            }
            None => None,
        }
    }

    pub fn visible(&self) -> Option<Notice> {
        self.visible_at(Instant::now())
    }

    pub fn render_at(&self, now: Instant) -> String {
        match self.visible_at(now) {
            Some(notice) => format!(
                "<div id=\"filter-feedback\" style=\"background-color: {}; opacity: 1\">{}</div>",
                notice.kind.color(),
                crate::html::escape_html(&notice.message)
            ),
            None => "<div id=\"filter-feedback\" style=\"opacity: 0\"></div>".to_string(),
        }
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeSink for NoticeBoard {
    fn show(&self, notice: Notice) {
        info!(message = %notice.message, kind = ?notice.kind, "filter feedback");
        self.show_at(notice, Instant::now());
    }
}
