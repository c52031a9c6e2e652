//! Event sink trait and test implementations.

use std::sync::{Arc, Mutex};

use super::{DomainEvent, Group};

/// Receives domain events for realtime delivery.
///
/// # Design rules
///
/// - `emit()` must be fast and non-blocking (no network calls, no DB
///   writes) - implementations queue for async processing
/// - delivery is best-effort: failure to emit must never fail the
///   originating ledger operation
pub trait EventSink: Send + Sync {
    /// Emit a single event to a group.
    fn emit(&self, group: Group, event: DomainEvent);
}

/// No-op implementation for tests or contexts that don't need events.
#[derive(Clone, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _group: Group, _event: DomainEvent) {}
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockEventSink {
    events: Arc<Mutex<Vec<(Group, DomainEvent)>>>,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<(Group, DomainEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Events addressed to one group.
    pub fn events_for(&self, group: &Group) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _)| g == group)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventSink for MockEventSink {
    fn emit(&self, group: Group, event: DomainEvent) {
        self.events.lock().unwrap().push((group, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_does_not_panic() {
        let sink = NoOpEventSink;
        sink.emit(
            Group::Admins,
            DomainEvent::RiskFlagged {
                user_id: "u1".into(),
                reasons: vec![],
            },
        );
    }

    #[test]
    fn mock_sink_collects_events() {
        let sink = MockEventSink::new();
        assert!(sink.is_empty());

        sink.emit(
            Group::User("u1".into()),
            DomainEvent::PaymentSettled {
                payment_id: "p1".into(),
                coins_credited: 100,
            },
        );
        sink.emit(
            Group::Admins,
            DomainEvent::WithdrawalNew {
                id: "w1".into(),
                user_id: "u1".into(),
                amount_etb: rust_decimal_macros::dec!(600.00),
            },
        );

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events_for(&Group::Admins).len(), 1);
        sink.clear();
        assert!(sink.is_empty());
    }
}
