// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fan-out of `OrchestratorEvent` to subscribers (notifier
//! slots, the SSE publisher, a log sink). Delivery is synchronous,
//! at-most-once, and ordered per emitter; a panicking subscriber is
//! isolated so it never blocks the emitter or other subscribers.

use ao_core::OrchestratorEvent;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Receives events published on the bus. Implementors must not panic across
/// an await point they don't own; a panic inside `on_event` is caught and
/// logged, never propagated to the emitter.
pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: &OrchestratorEvent);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Synchronous, single-owner fan-out bus. Subscribers are not pinned: a
/// subscriber can be removed at any time without affecting delivery to
/// others or past deliveries already in flight.
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscriptions.lock().push(Subscription { id, subscriber });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.lock().retain(|s| s.id != id);
    }

    /// Publishes `event` to every current subscriber, in subscription
    /// order. A subscriber that panics is logged and skipped; it does not
    /// stop delivery to the rest.
    pub fn publish(&self, event: OrchestratorEvent) {
        let subscribers: Vec<Arc<dyn EventSubscriber>> = self
            .subscriptions
            .lock()
            .iter()
            .map(|s| s.subscriber.clone())
            .collect();

        for subscriber in subscribers {
            let event_ref = &event;
            let result = catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event_ref)));
            if let Err(panic) = result {
                tracing::error!(
                    event_type = ?event.event_type,
                    panic = ?panic_message(&panic),
                    "event subscriber panicked; continuing fan-out"
                );
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
