use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::listeners::{Listeners, SubscriptionId};
use crate::cache::KeyValueStore;

use super::types::{MediaId, MediaItem};

const STORE_KEY: &str = "favorites";

/// Persisted favorite set keyed by media identity. Not time-bounded:
/// favorites only change when the user toggles them.
pub struct FavoritesStore {
    items: Mutex<HashMap<MediaId, MediaItem>>,
    store: Option<Arc<dyn KeyValueStore>>,
    listeners: Mutex<Listeners<Vec<MediaItem>>>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            store: None,
            listeners: Mutex::new(Listeners::new()),
        }
    }

    pub fn with_store(self, store: Arc<dyn KeyValueStore>) -> Self {
        if let Some(raw) = store.get(STORE_KEY) {
            match serde_json::from_str::<Vec<MediaItem>>(&raw) {
                Ok(items) => {
                    *self.items.lock().unwrap() =
                        items.into_iter().map(|i| (i.identity(), i)).collect();
                }
                Err(e) => log::warn!("favorites snapshot discarded: {e}"),
            }
        }
        Self {
            store: Some(store),
            ..self
        }
    }

    pub fn contains(&self, id: &MediaId) -> bool {
        self.items.lock().unwrap().contains_key(id)
    }

    pub fn add(&self, item: MediaItem) {
        self.items.lock().unwrap().insert(item.identity(), item);
        self.persist();
        self.notify();
    }

    pub fn remove(&self, id: &MediaId) {
        if self.items.lock().unwrap().remove(id).is_some() {
            self.persist();
            self.notify();
        }
    }

    /// Returns whether the item is a favorite after the toggle.
    pub fn toggle(&self, item: MediaItem) -> bool {
        let id = item.identity();
        if self.contains(&id) {
            self.remove(&id);
            false
        } else {
            self.add(item);
            true
        }
    }

    /// All favorites, sorted by identity for a stable listing.
    pub fn all(&self) -> Vec<MediaItem> {
        let items = self.items.lock().unwrap();
        let mut entries: Vec<(MediaId, MediaItem)> =
            items.iter().map(|(k, v)| (*k, v.clone())).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, item)| item).collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
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
        match serde_json::to_string(&self.all()) {
            Ok(raw) => store.set(STORE_KEY, &raw),
            Err(e) => log::error!("favorites snapshot failed: {e}"),
        }
    }

    fn notify(&self) {
        let all = self.all();
        let callbacks = self.listeners.lock().unwrap().callbacks();
        for callback in callbacks {
            callback(&all);
        }
    }
}

impl Default for FavoritesStore {
    fn default() -> Self {
        Self::new()
    }
}
