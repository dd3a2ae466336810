use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::listeners::{Listeners, SubscriptionId};
use super::store::KeyValueStore;

const STORE_KEY: &str = "error_logs";
const DEFAULT_MAX_LOGS: usize = 100;

/// Sink for failures that are worth surfacing but not worth throwing
/// across the UI boundary (a remote-control user has no way to see an
/// exception).
pub trait ErrorReporter: Send + Sync {
    fn report(&self, source: &str, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLog {
    pub timestamp_ms: i64,
    pub source: String,
    pub message: String,
}

/// Bounded most-recent-first error log, persisted so a settings screen
/// can show failures from previous sessions.
pub struct ErrorLogReporter {
    logs: Mutex<Vec<ErrorLog>>,
    max_logs: usize,
    store: Option<Arc<dyn KeyValueStore>>,
    listeners: Mutex<Listeners<[ErrorLog]>>,
}

impl ErrorLogReporter {
    pub fn new(max_logs: usize) -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            max_logs,
            store: None,
            listeners: Mutex::new(Listeners::new()),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        if let Some(raw) = store.get(STORE_KEY) {
            match serde_json::from_str::<Vec<ErrorLog>>(&raw) {
                Ok(mut logs) => {
                    logs.truncate(self.max_logs);
                    *self.logs.lock().unwrap() = logs;
                }
                Err(e) => log::warn!("error log snapshot discarded: {e}"),
            }
        }
        self.store = Some(store);
        self
    }

    pub fn logs(&self) -> Vec<ErrorLog> {
        self.logs.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.logs.lock().unwrap().clear();
        self.persist();
        self.notify();
    }

    pub fn add_listener(
        &self,
        listener: impl Fn(&[ErrorLog]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.lock().unwrap().add(Box::new(listener))
    }

    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().unwrap().remove(id)
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        match serde_json::to_string(&*self.logs.lock().unwrap()) {
            Ok(raw) => store.set(STORE_KEY, &raw),
            Err(e) => log::error!("error log snapshot failed: {e}"),
        }
    }

    fn notify(&self) {
        let logs = self.logs();
        let callbacks = self.listeners.lock().unwrap().callbacks();
        for callback in callbacks {
            callback(logs.as_slice());
        }
    }
}

impl Default for ErrorLogReporter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOGS)
    }
}

impl ErrorReporter for ErrorLogReporter {
    fn report(&self, source: &str, message: &str) {
        log::error!("[{source}] {message}");
        {
            let mut logs = self.logs.lock().unwrap();
            logs.insert(
                0,
                ErrorLog {
                    timestamp_ms: Utc::now().timestamp_millis(),
                    source: source.to_string(),
                    message: message.to_string(),
                },
            );
            logs.truncate(self.max_logs);
        }
        self.persist();
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;

    #[test]
    fn keeps_most_recent_first_and_bounded() {
        let reporter = ErrorLogReporter::new(3);
        for i in 0..5 {
            reporter.report("epg", &format!("failure {i}"));
        }
        let logs = reporter.logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message, "failure 4");
        assert_eq!(logs[2].message, "failure 2");
    }

    #[test]
    fn persists_and_restores_logs() {
        let store = Arc::new(MemoryStore::new());
        {
            let reporter = ErrorLogReporter::new(10).with_store(store.clone());
            reporter.report("catalog", "unreachable");
        }
        let restored = ErrorLogReporter::new(10).with_store(store);
        let logs = restored.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].source, "catalog");
    }

    #[test]
    fn clear_empties_and_notifies() {
        let reporter = ErrorLogReporter::new(10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_listener = Arc::clone(&seen);
        reporter.add_listener(move |logs| {
            seen_by_listener.lock().unwrap().push(logs.len());
        });
        reporter.report("epg", "boom");
        reporter.clear();
        assert!(reporter.logs().is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
    }
}
