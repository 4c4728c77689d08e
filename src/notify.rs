use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a notification stays visible unless dismissed first.
pub const AUTO_HIDE_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
}

/// Single-slot banner: a new notification replaces the old one outright.
#[derive(Debug)]
pub struct Notifier {
    current: Option<Notification>,
    auto_hide: Duration,
    next_id: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_auto_hide(Duration::seconds(AUTO_HIDE_SECS))
    }
}

impl Notifier {
    pub fn with_auto_hide(auto_hide: Duration) -> Self {
        Self {
            current: None,
            auto_hide,
            next_id: 1,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity, now: DateTime<Utc>) {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(Notification {
            id,
            message: message.into(),
            severity,
            shown_at: now,
        });
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// The notification still on screen at `now`, if any.
    pub fn current(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now - n.shown_at < self.auto_hide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_auto_hide_interval() {
        let mut notifier = Notifier::default();
        let t0 = Utc::now();
        notifier.notify("Added to favorites", Severity::Success, t0);

        assert!(notifier.current(t0 + Duration::milliseconds(2999)).is_some());
        assert!(notifier.current(t0 + Duration::seconds(AUTO_HIDE_SECS)).is_none());
    }

    #[test]
    fn newer_notification_supersedes_immediately() {
        let mut notifier = Notifier::default();
        let t0 = Utc::now();
        notifier.notify("Added to favorites", Severity::Success, t0);
        notifier.notify("Removed from favorites", Severity::Info, t0 + Duration::seconds(1));

        let shown = notifier.current(t0 + Duration::seconds(1)).unwrap();
        assert_eq!(shown.message, "Removed from favorites");
        assert_eq!(shown.severity, Severity::Info);
        assert_eq!(shown.id, 2);
        // The replacement restarts the clock.
        assert!(notifier.current(t0 + Duration::milliseconds(3500)).is_some());
    }

    #[test]
    fn dismiss_clears_before_expiry() {
        let mut notifier = Notifier::with_auto_hide(Duration::seconds(60));
        let t0 = Utc::now();
        notifier.notify("No movies found!", Severity::Error, t0);
        notifier.dismiss();
        assert!(notifier.current(t0).is_none());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Severity::Warning).unwrap(), "warning");
    }
}
