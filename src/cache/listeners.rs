use std::sync::Arc;

/// Opaque handle returned from a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out listener list shared by the caches and domain stores.
///
/// Holders invoke callbacks through [`Listeners::callbacks`] after
/// releasing their own lock, so a listener may re-enter the store it
/// subscribed to (subscribe, unsubscribe, read) without deadlocking.
pub(crate) struct Listeners<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Arc<dyn Fn(&T) + Send + Sync>)>,
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: Box<dyn Fn(&T) + Send + Sync>) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Arc::from(listener)));
        SubscriptionId(id)
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id.0);
        self.entries.len() != before
    }

    /// Snapshot of the registered callbacks. Callers drop the lock
    /// guarding this list before invoking them.
    pub fn callbacks(&self) -> Vec<Arc<dyn Fn(&T) + Send + Sync>> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
