use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};
use uuid::Uuid;

/// Why a write to one channel did not land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("channel closed")]
    Closed,
    #[error("channel buffer full")]
    Full,
}

/// Write side of one live connection.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: Uuid,
    tx: mpsc::Sender<Arc<str>>,
}

impl ChannelHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a serialized payload without waiting.
    pub fn write(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.tx.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// A new channel and the receiver its connection drains.
pub fn channel(capacity: usize) -> (ChannelHandle, mpsc::Receiver<Arc<str>>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ChannelHandle {
            id: Uuid::new_v4(),
            tx,
        },
        rx,
    )
}

/// Live notification channels per user.
///
/// Ephemeral: held only in process memory, so a restart drops every
/// registration and clients must reconnect. The registry never closes a
/// channel itself; it only tracks them.
#[derive(Debug, Clone, Default)]
pub struct NotificationRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Vec<ChannelHandle>>>>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: Uuid, channel: ChannelHandle) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let channels = map.entry(user_id).or_default();
        channels.push(channel);
        debug!("User {} now has {} live channel(s)", user_id, channels.len());
    }

    /// Remove one channel. Returns false if it was already gone.
    pub fn deregister(&self, user_id: Uuid, channel_id: Uuid) -> bool {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(channels) = map.get_mut(&user_id) else {
            return false;
        };

        let before = channels.len();
        channels.retain(|c| c.id != channel_id);
        let removed = channels.len() != before;

        if channels.is_empty() {
            map.remove(&user_id);
        }
        removed
    }

    /// Copy of the user's channels at this instant. Later registrations or
    /// removals do not affect the returned list.
    pub fn channels_for(&self, user_id: Uuid) -> Vec<ChannelHandle> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Create and register a channel whose registration ends when the
    /// returned [`Subscription`] is dropped.
    pub fn open(&self, user_id: Uuid, capacity: usize) -> Subscription {
        let (handle, rx) = channel(capacity);
        let channel_id = handle.id();
        self.register(user_id, handle);
        info!("User {} opened notification channel {}", user_id, channel_id);

        Subscription {
            user_id,
            channel_id,
            rx,
            registry: self.clone(),
        }
    }
}

/// Read side of a registered channel, tied to one connection.
#[derive(Debug)]
pub struct Subscription {
    user_id: Uuid,
    channel_id: Uuid,
    rx: mpsc::Receiver<Arc<str>>,
    registry: NotificationRegistry,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }

    /// Payloads queued but not yet read.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.deregister(self.user_id, self.channel_id);
        info!("User {} closed notification channel {}", self.user_id, self.channel_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_may_hold_several_channels() {
        let registry = NotificationRegistry::new();
        let user = Uuid::new_v4();
        let (a, _rx_a) = channel(4);
        let (b, _rx_b) = channel(4);

        registry.register(user, a.clone());
        registry.register(user, b.clone());

        let ids: Vec<Uuid> = registry.channels_for(user).iter().map(ChannelHandle::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
        assert!(registry.channels_for(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn deregister_twice_is_a_noop() {
        let registry = NotificationRegistry::new();
        let user = Uuid::new_v4();
        let (a, _rx) = channel(4);
        registry.register(user, a.clone());

        assert!(registry.deregister(user, a.id()));
        assert!(!registry.deregister(user, a.id()));
        assert!(!registry.deregister(Uuid::new_v4(), a.id()));
        assert!(registry.channels_for(user).is_empty());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_changes() {
        let registry = NotificationRegistry::new();
        let user = Uuid::new_v4();
        let (a, _rx_a) = channel(4);
        registry.register(user, a.clone());

        let snapshot = registry.channels_for(user);
        registry.deregister(user, a.id());
        let (b, _rx_b) = channel(4);
        registry.register(user, b);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), a.id());
    }

    #[test]
    fn dropping_subscription_deregisters() {
        let registry = NotificationRegistry::new();
        let user = Uuid::new_v4();

        let sub = registry.open(user, 4);
        assert_eq!(registry.channels_for(user).len(), 1);

        drop(sub);
        assert!(registry.channels_for(user).is_empty());
    }

    #[test]
    fn write_reports_full_and_closed() {
        let (handle, rx) = channel(1);
        assert!(handle.write("a".into()).is_ok());
        assert_eq!(handle.write("b".into()), Err(DeliveryError::Full));

        drop(rx);
        assert_eq!(handle.write("c".into()), Err(DeliveryError::Closed));
    }

    #[test]
    fn concurrent_register_and_deregister() {
        let registry = NotificationRegistry::new();
        let user = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let (c, _rx) = channel(1);
                        let id = c.id();
                        registry.register(user, c);
                        let _ = registry.channels_for(user);
                        assert!(registry.deregister(user, id));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(registry.channels_for(user).is_empty());
    }
}
