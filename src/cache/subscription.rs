use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

type Detach = Box<dyn FnOnce() + Send>;

/// Handle returned by [`ResourceCache::subscribe`](super::ResourceCache::subscribe).
///
/// Dropping the handle unsubscribes. Once `unsubscribe` (or drop) returns, no
/// later publish reaches the callback, and a delivery loop already running on
/// the same thread skips it. A call that another thread has already started
/// is not interrupted; state shared across threads has to be guarded by the
/// callback itself.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: Uuid,
    resource: &'static str,
    active: Arc<AtomicBool>,
    detach: Option<Detach>,
}

impl Subscription {
    pub(crate) fn new(
        id: Uuid,
        resource: &'static str,
        active: Arc<AtomicBool>,
        detach: Detach,
    ) -> Self {
        Self {
            id,
            resource,
            active,
            detach: Some(detach),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the cache this subscription is attached to
    #[must_use]
    pub const fn resource(&self) -> &'static str {
        self.resource
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
