//! Transient status line shown above the results.

use std::time::{Duration, Instant};

/// How long a success message stays up.
pub const SUCCESS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub posted_at: Instant,
    /// `None` keeps the notice until it is replaced.
    pub ttl: Option<Duration>,
}

impl Notice {
    pub fn success(message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            posted_at: now,
            ttl: Some(ttl),
        }
    }

    pub fn error(message: impl Into<String>, now: Instant) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            posted_at: now,
            ttl: None,
        }
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.ttl.map(|ttl| self.posted_at + ttl)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_expires_after_ttl() {
        let t0 = Instant::now();
        let notice = Notice::success("saved", t0, SUCCESS_TTL);
        assert!(!notice.is_expired(t0 + Duration::from_secs(4)));
        assert!(notice.is_expired(t0 + SUCCESS_TTL));
    }

    #[test]
    fn errors_never_expire() {
        let t0 = Instant::now();
        let notice = Notice::error("boom", t0);
        assert_eq!(notice.expires_at(), None);
        assert!(!notice.is_expired(t0 + Duration::from_secs(3600)));
    }
}
