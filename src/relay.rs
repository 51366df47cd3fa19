//! EmitterRelay - forwards bus events to an `event_emitter_rs::EventEmitter`.
//!
//! Every [`ChangeEvent`] is serialized to JSON and emitted as
//! `"mockdb:change"`. Events scoped to a collection are emitted a second
//! time as `"mockdb:change:<collection>"`. Store-wide events (reset, clear,
//! restore) only go out under `"mockdb:change"`.
//!
//! The emitter runs each callback on its own thread, so delivery is
//! asynchronous, unlike the bus itself.

use std::sync::Arc;

use event_emitter_rs::EventEmitter;
use parking_lot::Mutex;
use tracing::warn;

use crate::bus::{ChangeBus, ChangeEvent, Subscription, Topic};

/// Emitter event carrying every change.
pub const CHANGE_EVENT: &str = "mockdb:change";

/// Emitter event carrying changes to one collection.
pub fn collection_event(collection: &str) -> String {
    format!("{}:{}", CHANGE_EVENT, collection)
}

pub struct EmitterRelay {
    emitter: Arc<Mutex<EventEmitter>>,
    subscription: Subscription,
}

impl EmitterRelay {
    /// Relay `bus` into a fresh emitter.
    pub fn attach(bus: &ChangeBus) -> Self {
        Self::with_emitter(bus, EventEmitter::new())
    }

    pub fn with_emitter(bus: &ChangeBus, emitter: EventEmitter) -> Self {
        let emitter = Arc::new(Mutex::new(emitter));
        let target = Arc::clone(&emitter);

        let subscription = bus.subscribe(Topic::All, move |event: &ChangeEvent| {
            let payload = match serde_json::to_string(event) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, %event, "change event not relayed");
                    return;
                }
            };

            let mut emitter = target.lock();
            if let Some(collection) = &event.collection {
                emitter.emit(&collection_event(collection), payload.clone());
            }
            emitter.emit(CHANGE_EVENT, payload);
        });

        Self {
            emitter,
            subscription,
        }
    }

    /// Register an emitter callback. The payload is the event as JSON.
    /// Returns the listener id.
    pub fn on<F>(&self, event: &str, listener: F) -> String
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.lock().on(event, listener)
    }

    /// Remove a callback registered with [`on`](Self::on).
    pub fn remove_listener(&self, id: &str) -> bool {
        self.emitter.lock().remove_listener(id).is_some()
    }

    /// Stop relaying.
    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn relays_as_json() {
        let bus = ChangeBus::new();
        let relay = EmitterRelay::attach(&bus);

        let (tx, rx) = mpsc::channel::<String>();
        relay.on(CHANGE_EVENT, move |payload: String| {
            tx.send(payload).unwrap();
        });

        bus.publish(&ChangeEvent::created("tenders", 1));

        let payload = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let event: ChangeEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(event, ChangeEvent::created("tenders", 1));
    }

    #[test]
    fn collection_events_are_scoped() {
        let bus = ChangeBus::new();
        let relay = EmitterRelay::attach(&bus);

        let (tx, rx) = mpsc::channel::<String>();
        relay.on(&collection_event("employees"), move |payload: String| {
            tx.send(payload).unwrap();
        });

        bus.publish(&ChangeEvent::created("tenders", 1));
        bus.publish(&ChangeEvent::deleted("employees", 3));

        let payload = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let event: ChangeEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(event, ChangeEvent::deleted("employees", 3));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn detach_unsubscribes_from_bus() {
        let bus = ChangeBus::new();
        let relay = EmitterRelay::attach(&bus);
        assert_eq!(bus.listener_count(), 1);
        relay.detach();
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn remove_listener_by_id() {
        let bus = ChangeBus::new();
        let relay = EmitterRelay::attach(&bus);
        let id = relay.on(CHANGE_EVENT, |_payload: String| {});
        assert!(relay.remove_listener(&id));
        assert!(!relay.remove_listener(&id));
    }
}
