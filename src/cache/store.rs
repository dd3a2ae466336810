use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// The persistence surface the caches snapshot into: a string-keyed
/// string store (browser storage or equivalent on a TV). Failures are
/// an observability concern, not a control-flow one, so the surface is
/// infallible and implementations log what goes wrong.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store for tests and the demo shell.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// One file per key under a state directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|config| config.join("zaptv").join("state"))
            .unwrap_or_else(|| PathBuf::from("state"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            log::error!("could not create state dir {:?}: {e}", self.dir);
            return;
        }
        if let Err(e) = std::fs::write(self.path_for(key), value) {
            log::error!("could not persist {key}: {e}");
        }
    }
}
