// Notification sink
//
// Mirrors operation outcomes to the front end (over a broadcast channel) and to the
// log. The front end subscribes once and renders each notification as a toast.

use crate::metrics::Metrics;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A user-visible notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Info(msg) | Notification::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

/// Broadcasts notifications to every subscriber and to `tracing`.
///
/// Multiple subscribers can listen simultaneously. Sending while nobody listens is
/// fine; the notification still reaches the log.
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
    metrics: Arc<Metrics>,
}

impl Notifier {
    /// Create a new Notifier with a broadcast channel buffer of 100 notifications
    pub fn new(metrics: Arc<Metrics>) -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx, metrics }
    }

    /// Subscribe to all future notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn info(&self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!("{}", msg);
        self.send(Notification::Info(msg));
    }

    pub fn error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::error!("{}", msg);
        self.send(Notification::Error(msg));
    }

    fn send(&self, notification: Notification) {
        // No receivers is not a failure
        let heard = self.tx.send(notification).is_ok();
        self.metrics.record_notification(heard);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Arc::new(Metrics::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let notifier = Notifier::default();
        let mut rx1 = notifier.subscribe();
        let mut rx2 = notifier.subscribe();

        notifier.info("Tested Sonarr download client qBit (1).");
        notifier.error("Testing Sonarr download client: qBit (1): boom");

        for rx in [&mut rx1, &mut rx2] {
            let first = rx.recv().await.unwrap();
            assert_eq!(first, Notification::Info("Tested Sonarr download client qBit (1).".into()));
            let second = rx.recv().await.unwrap();
            assert!(second.is_error());
            assert!(second.message().ends_with("boom"));
        }
    }

    #[test]
    fn test_send_without_subscribers() {
        let metrics = Arc::new(Metrics::new());
        let notifier = Notifier::new(metrics.clone());

        notifier.error("nobody listens");

        assert_eq!(metrics.notifications_unheard.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.notifications_sent.load(Ordering::Relaxed), 0);
    }
}
