//! Realtime event fan-out.
//!
//! Core services emit `DomainEvent`s through the `EventSink` trait; the
//! server's sink pushes them onto a broadcast bus that SSE connections
//! subscribe to. Lagging or absent listeners never block producers.

use tokio::sync::broadcast;

use amora_core::events::{DomainEvent, EventSink, Group};

/// An event addressed to one channel (`user_{id}` or `admins`).
#[derive(Clone, Debug)]
pub struct ChannelEvent {
    pub channel: String,
    pub event: DomainEvent,
}

/// Broadcast bus shared by all SSE connections.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChannelEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ChannelEvent) {
        // No receivers is fine; delivery is best-effort.
        let _ = self.sender.send(event);
    }
}

/// `EventSink` implementation backed by the broadcast bus.
pub struct BroadcastEventSink {
    bus: EventBus,
}

impl BroadcastEventSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, group: Group, event: DomainEvent) {
        self.bus.publish(ChannelEvent {
            channel: group.channel(),
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sink_publishes_to_the_right_channel() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let sink = BroadcastEventSink::new(bus);

        sink.emit(
            Group::User("u1".into()),
            DomainEvent::PaymentSettled {
                payment_id: "p1".into(),
                coins_credited: 50,
            },
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received.channel, "user_u1");
        assert_eq!(received.event.kind(), "payment.settled");
    }

    #[test]
    fn publish_without_subscribers_does_not_fail() {
        let bus = EventBus::new(4);
        bus.publish(ChannelEvent {
            channel: "admins".into(),
            event: DomainEvent::RiskFlagged {
                user_id: "u1".into(),
                reasons: vec![],
            },
        });
    }
}
