//! Transient success/error banners.
//!
//! The app layer owns the timers; this module only decides what a notice
//! is and when it has expired.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use ts_rs::TS;

/// Default time a notice stays on screen.
pub const DEFAULT_NOTICE_TTL_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    #[ts(as = "String")]
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn success(id: u64, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Notice {
            id,
            level: NoticeLevel::Success,
            message: message.into(),
            raised_at: now,
        }
    }

    pub fn error(id: u64, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Notice {
            id,
            level: NoticeLevel::Error,
            message: message.into(),
            raised_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.raised_at >= ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let t0 = Utc::now();
        let notice = Notice::success(1, "Lưu thành công", t0);
        let ttl = Duration::seconds(DEFAULT_NOTICE_TTL_SECS as i64);
        assert!(!notice.is_expired(t0 + Duration::seconds(2), ttl));
        assert!(notice.is_expired(t0 + Duration::seconds(3), ttl));
    }
}
