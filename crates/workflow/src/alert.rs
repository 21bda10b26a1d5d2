//! Alert channel — a single-slot, last-write-wins user notification.
//!
//! Not an error log: raising a new alert overwrites the pending one, and an
//! alert disappears on its own once its display duration has passed.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How long an alert stays visible by default.
pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_secs(6);

#[derive(Debug, Clone)]
struct Pending {
    message: String,
    raised_at: Instant,
}

/// Holds at most one pending alert.
#[derive(Debug)]
pub struct AlertChannel {
    slot: Mutex<Option<Pending>>,
    duration: Duration,
}

impl AlertChannel {
    pub fn new(duration: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            duration,
        }
    }

    /// Show `message`, replacing whatever was pending.
    pub fn raise(&self, message: impl Into<String>) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Pending {
            message: message.into(),
            raised_at: Instant::now(),
        });
    }

    /// The pending message, if it has not expired or been dismissed.
    pub fn current(&self) -> Option<String> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(pending) if pending.raised_at.elapsed() < self.duration => {
                Some(pending.message.clone())
            }
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl Default for AlertChannel {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_write_wins() {
        let alerts = AlertChannel::default();
        assert_eq!(alerts.current(), None);

        alerts.raise("first");
        alerts.raise("second");
        assert_eq!(alerts.current().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn dismiss_clears() {
        let alerts = AlertChannel::default();
        alerts.raise("boom");
        alerts.dismiss();
        assert_eq!(alerts.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_duration() {
        let alerts = AlertChannel::default();
        alerts.raise("Network error");

        tokio::time::advance(Duration::from_millis(5_999)).await;
        assert_eq!(alerts.current().as_deref(), Some("Network error"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(alerts.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_restarts_the_clock() {
        let alerts = AlertChannel::new(Duration::from_secs(2));
        alerts.raise("old");
        tokio::time::advance(Duration::from_secs(1)).await;
        alerts.raise("new");
        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(alerts.current().as_deref(), Some("new"));
    }
}
