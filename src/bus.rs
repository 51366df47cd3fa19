//! ChangeBus - in-process change notification.
//!
//! Every write through [`MockDb`](crate::MockDb) publishes one [`ChangeEvent`]
//! after the store mutation has completed. Listeners subscribe either to
//! everything (`Topic::All`) or to one collection (`Topic::Collection`);
//! store-wide events (reset, clear, restore) reach every listener.
//!
//! Delivery is synchronous and in subscription order. Listeners are called
//! outside the bus lock, so they may publish, subscribe or unsubscribe.
//!
//! ```
//! use procure_mockdb::bus::{ChangeBus, ChangeEvent, Topic};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let bus = ChangeBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! let _subscription = bus.subscribe(Topic::collection("tenders"), move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.publish(&ChangeEvent::created("tenders", 1));
//! bus.publish(&ChangeEvent::created("employees", 1));
//! bus.publish(&ChangeEvent::cleared());
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What kind of write happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Reset,
    Cleared,
    Restored,
}

impl ChangeKind {
    /// True for kinds that affect every collection.
    pub fn is_store_wide(self) -> bool {
        matches!(
            self,
            ChangeKind::Reset | ChangeKind::Cleared | ChangeKind::Restored
        )
    }
}

/// Notification that the store changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// `None` for store-wide changes.
    pub collection: Option<String>,
    pub id: Option<u64>,
}

impl ChangeEvent {
    pub fn created(collection: impl Into<String>, id: u64) -> Self {
        Self::record(ChangeKind::Created, collection, id)
    }

    pub fn updated(collection: impl Into<String>, id: u64) -> Self {
        Self::record(ChangeKind::Updated, collection, id)
    }

    pub fn deleted(collection: impl Into<String>, id: u64) -> Self {
        Self::record(ChangeKind::Deleted, collection, id)
    }

    pub fn reset() -> Self {
        Self::store_wide(ChangeKind::Reset)
    }

    pub fn cleared() -> Self {
        Self::store_wide(ChangeKind::Cleared)
    }

    pub fn restored() -> Self {
        Self::store_wide(ChangeKind::Restored)
    }

    fn record(kind: ChangeKind, collection: impl Into<String>, id: u64) -> Self {
        Self {
            kind,
            collection: Some(collection.into()),
            id: Some(id),
        }
    }

    fn store_wide(kind: ChangeKind) -> Self {
        Self {
            kind,
            collection: None,
            id: None,
        }
    }

    /// True when a reader of `collection` must refresh.
    pub fn affects(&self, collection: &str) -> bool {
        self.collection.as_deref().map_or(true, |c| c == collection)
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.collection, self.id) {
            (Some(collection), Some(id)) => write!(f, "{:?} {}:{}", self.kind, collection, id),
            (Some(collection), None) => write!(f, "{:?} {}", self.kind, collection),
            _ => write!(f, "{:?}", self.kind),
        }
    }
}

/// Which events a listener receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every event.
    All,
    /// Events for one collection, plus store-wide events.
    Collection(String),
}

impl Topic {
    pub fn collection(name: impl Into<String>) -> Self {
        Topic::Collection(name.into())
    }

    pub fn accepts(&self, event: &ChangeEvent) -> bool {
        match self {
            Topic::All => true,
            Topic::Collection(name) => event.affects(name),
        }
    }
}

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Registration {
    id: u64,
    topic: Topic,
    listener: Listener,
}

#[derive(Default)]
struct BusInner {
    listeners: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        listeners.len() != before
    }
}

/// Synchronous publish/subscribe bus for [`ChangeEvent`]s.
///
/// Clone-friendly via Arc: clones share listeners.
#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned
    /// `Subscription` is dropped or unsubscribed.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe<F>(&self, topic: Topic, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(id, ?topic, "listener subscribed");
        self.inner.listeners.write().push(Registration {
            id,
            topic,
            listener: Arc::new(listener),
        });

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every matching listener. Returns how many were called.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let targets: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|registration| registration.topic.accepts(event))
            .map(|registration| Arc::clone(&registration.listener))
            .collect();

        trace!(%event, listeners = targets.len(), "publishing change");
        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }
}

/// Guard for a registered listener.
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Remove the listener now. Returns false if the bus is already gone.
    pub fn unsubscribe(self) -> bool {
        self.detach()
    }

    fn detach(&self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => bus.remove(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detach() {
            trace!(id = self.id, "listener unsubscribed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
