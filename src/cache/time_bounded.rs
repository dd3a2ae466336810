use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::listeners::{Listeners, SubscriptionId};
use super::report::ErrorReporter;
use super::store::KeyValueStore;

/// Cache read failures that actually reach the caller. A fetch failure
/// with a previous good value is *not* one of these: the stale value is
/// served and the failure only goes to the error reporter.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("fetch for {key} failed with no cached value: {source}")]
    FetchFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

type StalenessRule<V> = Box<dyn Fn(&V, DateTime<Utc>) -> bool + Send + Sync>;

#[derive(Clone, Serialize, Deserialize)]
struct Entry<V> {
    value: V,
    #[serde(rename = "fetchedAt", with = "chrono::serde::ts_milliseconds")]
    fetched_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, V: Serialize",
    deserialize = "K: Deserialize<'de>, V: Deserialize<'de>"
))]
struct Snapshot<K, V> {
    entries: Vec<(K, Entry<V>)>,
}

struct Shared<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// Keys forced to refetch on the next read regardless of TTL. An
    /// in-flight fetch that started before the invalidation stores its
    /// result without clearing the flag, so the read after it still
    /// refetches.
    invalidated: HashSet<K>,
}

/// Generic keyed store with a TTL, a pluggable staleness predicate,
/// single-flight refetch, stale-serving fallback, persistence snapshots
/// and per-key subscriber fan-out.
///
/// Entries are replaced whole on refresh, never merged.
pub struct TimeBoundedCache<K, V> {
    name: String,
    ttl: Duration,
    staleness: Option<StalenessRule<V>>,
    shared: Mutex<Shared<K, V>>,
    flights: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
    subscribers: Mutex<HashMap<K, Listeners<V>>>,
    store: Option<Arc<dyn KeyValueStore>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl<K, V> TimeBoundedCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    /// `name` doubles as the persistence key when a store is attached.
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl,
            staleness: None,
            shared: Mutex::new(Shared {
                entries: HashMap::new(),
                invalidated: HashSet::new(),
            }),
            flights: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(HashMap::new()),
            store: None,
            reporter: None,
        }
    }

    /// Mark entries stale before the TTL elapses (e.g. an EPG slice
    /// whose programs have all ended).
    pub fn with_staleness(
        mut self,
        rule: impl Fn(&V, DateTime<Utc>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.staleness = Some(Box::new(rule));
        self
    }

    /// Attach a persistence store and restore the previous snapshot.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        if let Some(raw) = store.get(&self.name) {
            match serde_json::from_str::<Snapshot<K, V>>(&raw) {
                Ok(snapshot) => {
                    let mut shared = self.shared.lock().unwrap();
                    shared.entries = snapshot.entries.into_iter().collect();
                    log::debug!(
                        "cache {}: restored {} entries",
                        self.name,
                        shared.entries.len()
                    );
                }
                Err(e) => log::warn!("cache {}: snapshot discarded: {e}", self.name),
            }
        }
        self.store = Some(store);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Read-through get.
    ///
    /// Serves the cached value without touching the network while it is
    /// fresh; otherwise fetches, stores and fans out. At most one fetch
    /// is in flight per key: concurrent callers for the same key await
    /// the same flight and read its result. On fetch failure the last
    /// known value is served; the failure only reaches the caller when
    /// no value was ever stored.
    pub async fn get<F, Fut>(&self, key: K, fetch: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        if let Some(value) = self.fresh_value(&key, Utc::now()) {
            return Ok(value);
        }

        let flight = self.flight_lock(&key);
        let guard = flight.lock().await;
        let result = self.refresh(&key, fetch).await;
        drop(guard);
        self.release_flight(&key, flight);
        result
    }

    async fn refresh<F, Fut>(&self, key: &K, fetch: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        // Another caller may have refreshed while we waited on the
        // flight lock.
        if let Some(value) = self.fresh_value(key, Utc::now()) {
            return Ok(value);
        }

        // This fetch satisfies any pending invalidation.
        self.shared.lock().unwrap().invalidated.remove(key);

        match fetch().await {
            Ok(value) => {
                {
                    let mut shared = self.shared.lock().unwrap();
                    shared.entries.insert(
                        key.clone(),
                        Entry {
                            value: value.clone(),
                            fetched_at: Utc::now(),
                        },
                    );
                }
                self.persist();
                self.notify(key, &value);
                Ok(value)
            }
            Err(source) => {
                self.report(key, &source);
                match self.peek(key) {
                    Some(previous) => {
                        log::warn!(
                            "cache {}: serving stale value for {key:?} after fetch failure",
                            self.name
                        );
                        Ok(previous)
                    }
                    None => Err(CacheError::FetchFailed {
                        key: format!("{key:?}"),
                        source,
                    }),
                }
            }
        }
    }

    /// Force the next read to refetch regardless of TTL. Does not abort
    /// a fetch already in flight.
    pub fn invalidate(&self, key: &K) {
        self.shared.lock().unwrap().invalidated.insert(key.clone());
    }

    /// Cached value, if any, with no freshness check and no fetch.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.shared
            .lock()
            .unwrap()
            .entries
            .get(key)
            .map(|e| e.value.clone())
    }

    pub fn len(&self) -> usize {
        self.shared.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().unwrap().entries.is_empty()
    }

    pub fn clear(&self) {
        {
            let mut shared = self.shared.lock().unwrap();
            shared.entries.clear();
            shared.invalidated.clear();
        }
        self.persist();
    }

    /// Listeners run after every successful refresh of `key`.
    pub fn subscribe(
        &self,
        key: K,
        listener: impl Fn(&V) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .add(Box::new(listener))
    }

    pub fn unsubscribe(&self, key: &K, id: SubscriptionId) -> bool {
        self.subscribers
            .lock()
            .unwrap()
            .get_mut(key)
            .is_some_and(|listeners| listeners.remove(id))
    }

    fn fresh_value(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let shared = self.shared.lock().unwrap();
        if shared.invalidated.contains(key) {
            return None;
        }
        let entry = shared.entries.get(key)?;
        let age = now.signed_duration_since(entry.fetched_at);
        if age.num_milliseconds() >= self.ttl.as_millis() as i64 || age.num_milliseconds() < 0 {
            return None;
        }
        if let Some(rule) = &self.staleness {
            if rule(&entry.value, now) {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    fn flight_lock(&self, key: &K) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(
            self.flights
                .lock()
                .unwrap()
                .entry(key.clone())
                .or_default(),
        )
    }

    /// Drop this caller's handle on the flight lock and evict the map
    /// entry once nobody else holds one, so the map tracks in-flight
    /// keys instead of every key ever fetched.
    fn release_flight(&self, key: &K, flight: Arc<tokio::sync::Mutex<()>>) {
        let mut flights = self.flights.lock().unwrap();
        drop(flight);
        if flights.get(key).is_some_and(|f| Arc::strong_count(f) == 1) {
            flights.remove(key);
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let snapshot = Snapshot {
            entries: self
                .shared
                .lock()
                .unwrap()
                .entries
                .iter()
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect(),
        };
        match serde_json::to_string(&snapshot) {
            Ok(raw) => store.set(&self.name, &raw),
            Err(e) => log::error!("cache {}: snapshot failed: {e}", self.name),
        }
    }

    fn notify(&self, key: &K, value: &V) {
        let callbacks = match self.subscribers.lock().unwrap().get(key) {
            Some(listeners) => listeners.callbacks(),
            None => return,
        };
        for callback in callbacks {
            callback(value);
        }
    }

    fn report(&self, key: &K, source: &anyhow::Error) {
        log::error!("cache {}: fetch for {key:?} failed: {source:#}", self.name);
        if let Some(reporter) = &self.reporter {
            reporter.report(&self.name, &format!("fetch for {key:?} failed: {source:#}"));
        }
    }
}
