use super::subscription::Subscription;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscriber<T> {
    id: Uuid,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

struct Slot<T> {
    latest: Option<T>,
    version: u64,
    subscribers: Vec<Subscriber<T>>,
}

/// Single-slot broadcaster holding the latest value of one resource.
///
/// New subscribers are replayed the current value, if any. Every later
/// `publish` is delivered synchronously, in subscription order. No lock is
/// held while callbacks run, so a callback may subscribe or unsubscribe on
/// the same cache.
///
/// Delivery runs on the publishing thread. With publishers on several threads
/// a callback can still be mid-call when its `Subscription` is dropped.
pub struct ResourceCache<T> {
    name: &'static str,
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for ResourceCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("ResourceCache")
            .field("name", &self.name)
            .field("filled", &slot.latest.is_some())
            .field("version", &slot.version)
            .field("subscribers", &slot.subscribers.len())
            .finish()
    }
}

fn lock<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    // Callbacks never run under the lock, so poisoning can only come from a
    // panic in our own bookkeeping; the slot is still consistent.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> ResourceCache<T>
where
    T: Clone + Send + 'static,
{
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self::create(name, None)
    }

    #[must_use]
    pub fn create(name: &'static str, initial: Option<T>) -> Self {
        Self {
            name,
            slot: Arc::new(Mutex::new(Slot {
                latest: initial,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Register `callback`; it is invoked right away with the current value
    /// when one exists.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        let active = Arc::new(AtomicBool::new(true));
        let callback: Callback<T> = Arc::new(callback);

        let (replay, count) = {
            let mut slot = lock(&self.slot);
            slot.subscribers.push(Subscriber {
                id,
                active: Arc::clone(&active),
                callback: Arc::clone(&callback),
            });
            (slot.latest.clone(), slot.subscribers.len())
        };
        debug!("📡 SUBSCRIBE {}: {id} ({count} active)", self.name);

        let weak = Arc::downgrade(&self.slot);
        let name = self.name;
        let subscription = Subscription::new(
            id,
            name,
            Arc::clone(&active),
            Box::new(move || {
                if let Some(slot) = weak.upgrade() {
                    lock(&slot).subscribers.retain(|s| s.id != id);
                    debug!("📴 UNSUBSCRIBE {name}: {id}");
                }
            }),
        );

        if let Some(value) = replay {
            if active.load(Ordering::Acquire) {
                callback(&value);
            }
        }

        subscription
    }

    /// Detach `subscription`. See [`Subscription`] for what is guaranteed
    /// about calls already in progress.
    pub fn unsubscribe(&self, subscription: Subscription) {
        debug_assert_eq!(subscription.resource(), self.name);
        subscription.unsubscribe();
    }

    /// Replace the latest value and notify every current subscriber.
    pub fn publish(&self, value: T) {
        let (version, targets) = {
            let mut slot = lock(&self.slot);
            slot.version += 1;
            slot.latest = Some(value.clone());
            let targets: Vec<_> = slot
                .subscribers
                .iter()
                .map(|s| (Arc::clone(&s.active), Arc::clone(&s.callback)))
                .collect();
            (slot.version, targets)
        };
        debug!(
            "💾 PUBLISH {} v{version} -> {} subscribers",
            self.name,
            targets.len()
        );

        for (active, callback) in targets {
            if active.load(Ordering::Acquire) {
                callback(&value);
            }
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<T> {
        lock(&self.slot).latest.clone()
    }

    /// Number of publishes so far
    #[must_use]
    pub fn version(&self) -> u64 {
        lock(&self.slot).version
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.slot).subscribers.len()
    }
}
