//! Sink delivery with event publishing.

use crate::error::SupervisorError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::RetryPolicy;
use crate::sinks::Delivery;

/// Hands `err` to the policy's sink and publishes what happened to it.
pub(crate) fn report(policy: &RetryPolicy, bus: &Bus, err: SupervisorError) -> Delivery {
    let connection = err.connection().map(str::to_owned);
    let reason = err.to_string();
    let delivery = policy.report(err);

    let ev = match &delivery {
        Delivery::Delivered => Event::new(EventKind::ErrorForwarded).with_reason(reason),
        Delivery::Discarded => Event::new(EventKind::ErrorDiscarded).with_reason(reason),
        Delivery::Panicked(info) => Event::new(EventKind::SinkPanicked).with_reason(info.as_str()),
    };
    bus.publish(match connection {
        Some(addr) => ev.with_connection(addr),
        None => ev,
    });
    delivery
}
