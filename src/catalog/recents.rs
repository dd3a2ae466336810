use std::sync::{Arc, Mutex};

use crate::cache::listeners::{Listeners, SubscriptionId};
use crate::cache::KeyValueStore;

use super::types::MediaItem;

const STORE_KEY: &str = "recent_channels";

pub const DEFAULT_RECENTS_CAPACITY: usize = 10;

struct Inner {
    items: Vec<MediaItem>,
    capacity: usize,
}

/// Persisted "recently viewed" history: most-recent-first, fixed
/// capacity, de-duplicated by media identity.
pub struct RecencyStore {
    inner: Mutex<Inner>,
    store: Option<Arc<dyn KeyValueStore>>,
    listeners: Mutex<Listeners<Vec<MediaItem>>>,
}

impl RecencyStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                capacity,
            }),
            store: None,
            listeners: Mutex::new(Listeners::new()),
        }
    }

    pub fn with_store(self, store: Arc<dyn KeyValueStore>) -> Self {
        if let Some(raw) = store.get(STORE_KEY) {
            match serde_json::from_str::<Vec<MediaItem>>(&raw) {
                Ok(items) => {
                    let mut inner = self.inner.lock().unwrap();
                    inner.items = items;
                    let capacity = inner.capacity;
                    inner.items.truncate(capacity);
                }
                Err(e) => log::warn!("recents snapshot discarded: {e}"),
            }
        }
        Self {
            store: Some(store),
            ..self
        }
    }

    /// Record a viewing: any older entry with the same identity is
    /// removed, the item goes to the front, the tail is truncated to
    /// capacity.
    pub fn record(&self, item: MediaItem) {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = item.identity();
            inner.items.retain(|existing| existing.identity() != id);
            inner.items.insert(0, item);
            let capacity = inner.capacity;
            inner.items.truncate(capacity);
        }
        self.persist();
        self.notify();
    }

    pub fn items(&self) -> Vec<MediaItem> {
        self.inner.lock().unwrap().items.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().capacity
    }

    /// Change the capacity at runtime. Shrinking truncates immediately.
    pub fn set_capacity(&self, capacity: usize) {
        let changed = {
            let mut inner = self.inner.lock().unwrap();
            inner.capacity = capacity;
            if inner.items.len() > capacity {
                inner.items.truncate(capacity);
                true
            } else {
                false
            }
        };
        if changed {
            self.persist();
            self.notify();
        }
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().items.clear();
        self.persist();
        self.notify();
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Vec<MediaItem>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.lock().unwrap().add(Box::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().unwrap().remove(id)
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        match serde_json::to_string(&self.items()) {
            Ok(raw) => store.set(STORE_KEY, &raw),
            Err(e) => log::error!("recents snapshot failed: {e}"),
        }
    }

    fn notify(&self) {
        let items = self.items();
        let callbacks = self.listeners.lock().unwrap().callbacks();
        for callback in callbacks {
            callback(&items);
        }
    }
}

impl Default for RecencyStore {
    fn default() -> Self {
        Self::new(DEFAULT_RECENTS_CAPACITY)
    }
}
