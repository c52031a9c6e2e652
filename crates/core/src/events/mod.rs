//! Domain events and the realtime notification sink.

mod domain_event;
mod sink;

pub use domain_event::{DomainEvent, Group};
pub use sink::{EventSink, MockEventSink, NoOpEventSink};
