//! Registry notifications and the sinks that consume them.
//!
//! Every committed mutation produces exactly one [`RegistryEvent`], delivered
//! to each attached [`EventSink`] in commit order. Sinks are called while the
//! registry write lock is held, so they must return promptly.

use crate::types::{Fingerprint, Identity};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::info;

/// Append-only audit notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    DiplomaIssued {
        fingerprint: Fingerprint,
        recipient: Identity,
    },
    AdminChanged {
        previous: Identity,
        current: Identity,
    },
}

/// Consumer of registry notifications.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RegistryEvent);
}

/// Emits one structured log line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &RegistryEvent) {
        match event {
            RegistryEvent::DiplomaIssued {
                fingerprint,
                recipient,
            } => info!(
                target: "diploma_registry::events",
                %fingerprint,
                %recipient,
                "DiplomaIssued"
            ),
            RegistryEvent::AdminChanged { previous, current } => info!(
                target: "diploma_registry::events",
                %previous,
                %current,
                "AdminChanged"
            ),
        }
    }
}

/// In-memory audit log.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: RwLock<Vec<RegistryEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far, oldest first.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for MemoryEventSink {
    fn publish(&self, event: &RegistryEvent) {
        self.events.write().push(event.clone());
    }
}

/// Fans events out to any number of async subscribers.
///
/// Publishing never blocks; slow subscribers observe `RecvError::Lagged`
/// once the channel capacity is exceeded.
#[derive(Debug)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<RegistryEvent>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl BroadcastEventSink {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }

    /// Number of (event, subscriber) deliveries so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Events published while nobody was subscribed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventSink for BroadcastEventSink {
    fn publish(&self, event: &RegistryEvent) {
        match self.sender.send(event.clone()) {
            Ok(receivers) => {
                self.delivered.fetch_add(receivers as u64, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued() -> RegistryEvent {
        RegistryEvent::DiplomaIssued {
            fingerprint: Fingerprint::new([7u8; 32]),
            recipient: Identity::new([8u8; 20]),
        }
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemoryEventSink::new();
        let changed = RegistryEvent::AdminChanged {
            previous: Identity::new([1u8; 20]),
            current: Identity::new([2u8; 20]),
        };
        sink.publish(&issued());
        sink.publish(&changed);
        assert_eq!(sink.events(), vec![issued(), changed]);
    }

    #[test]
    fn broadcast_without_subscribers_is_counted_as_dropped() {
        let sink = BroadcastEventSink::default();
        sink.publish(&issued());
        assert_eq!(sink.dropped(), 1);
        assert_eq!(sink.delivered(), 0);
    }

    #[tokio::test]
    async fn broadcast_delivers_to_subscribers() {
        let sink = BroadcastEventSink::new(8);
        let mut first = sink.subscribe();
        let mut second = sink.subscribe();

        sink.publish(&issued());

        assert_eq!(first.recv().await.unwrap(), issued());
        assert_eq!(second.recv().await.unwrap(), issued());
        assert_eq!(sink.delivered(), 2);
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(issued()).unwrap();
        assert_eq!(json["event"], "diploma_issued");
        assert_eq!(json["recipient"], format!("0x{}", "08".repeat(20)));
    }
}
