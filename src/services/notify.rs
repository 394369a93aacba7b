//! Notification sink for triggered alerts.
//!
//! The sink is a capability-gated side channel: it may be unavailable, and
//! delivery only happens while permission is `Granted`. The monitor treats
//! every failure here as best-effort; a lost notification never blocks
//! alert consumption.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are not available")]
    Unavailable,

    #[error("notification permission is not granted")]
    NotGranted,

    #[error("no connected receiver accepted the notification")]
    NoReceiver,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn is_available(&self) -> bool;

    fn permission(&self) -> Permission;

    /// Fire-and-forget; only meaningful while `permission()` is `Default`.
    fn request_permission(&self);

    /// Best-effort delivery of one notification.
    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Fans notifications out to every open dashboard page over the app's
/// broadcast channel; the page-side script turns the SSE event into a
/// browser notification. Permission tracks whether anyone is listening:
/// `Granted` while at least one page is subscribed, `Default` otherwise.
#[derive(Clone)]
pub struct SseNotifier {
    events_tx: broadcast::Sender<String>,
}

impl SseNotifier {
    pub fn new(events_tx: broadcast::Sender<String>) -> Self {
        Self { events_tx }
    }
}

#[async_trait]
impl NotificationSink for SseNotifier {
    fn is_available(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        if self.events_tx.receiver_count() > 0 {
            Permission::Granted
        } else {
            Permission::Default
        }
    }

    fn request_permission(&self) {
        // The browser owns the actual permission prompt; there is nothing
        // to do server-side.
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission() != Permission::Granted {
            return Err(NotifyError::NotGranted);
        }

        let payload = json!({
            "event": "notification",
            "title": title,
            "body": body,
        })
        .to_string();

        self.events_tx
            .send(payload)
            .map(|_| ())
            .map_err(|_| NotifyError::NoReceiver)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::{NotificationSink, Permission, SseNotifier};

    #[tokio::test]
    async fn permission_is_default_without_subscribers() {
        let (tx, rx) = broadcast::channel::<String>(16);
        drop(rx);
        let notifier = SseNotifier::new(tx);

        assert!(notifier.is_available());
        assert_eq!(notifier.permission(), Permission::Default);
        assert!(notifier.notify("t", "b").await.is_err());
    }

    #[tokio::test]
    async fn delivers_to_subscribed_receiver() {
        let (tx, mut rx) = broadcast::channel::<String>(16);
        let notifier = SseNotifier::new(tx);

        assert_eq!(notifier.permission(), Permission::Granted);
        notifier
            .notify("Crypto Price Alert", "bitcoin reached $51000")
            .await
            .expect("notify");

        let payload = rx.recv().await.expect("receive");
        assert!(payload.contains("Crypto Price Alert"));
        assert!(payload.contains("bitcoin reached"));
    }
}
