//! Broadcast channel for session changes.
//!
//! [`SessionBus`] wraps a [`tokio::sync::broadcast`] channel. The identity
//! provider publishes a [`SessionChange`] on every sign-in, sign-out and
//! refresh; the admin session context subscribes once at startup.

use tokio::sync::broadcast;

use super::SessionChange;

/// Broadcast bus for [`SessionChange`]s.
///
/// When the ring buffer is full, the oldest changes are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct SessionBus {
    sender: broadcast::Sender<SessionChange>,
}

impl SessionBus {
    /// Creates a bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a change to all subscribers.
    ///
    /// Returns the number of receivers that got it; with no receivers the
    /// change is dropped.
    pub fn publish(&self, change: SessionChange) -> usize {
        tracing::debug!(kind = change.kind(), "session change");
        self.sender.send(change).unwrap_or(0)
    }

    /// Creates a receiver for all future changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.sender.subscribe()
    }

    /// Current number of receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn signed_out(token: &str) -> SessionChange {
        SessionChange::SignedOut {
            token: token.to_string(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = SessionBus::new(8);
        assert_eq!(bus.publish(signed_out("t")), 0);
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_change() {
        let bus = SessionBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.publish(signed_out("abc")), 2);

        let Ok(first) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(second) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(first, second);
        assert_eq!(first.kind(), "signed_out");
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = SessionBus::new(8);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
