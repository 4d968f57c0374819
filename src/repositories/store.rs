//! Key-value persistence shared by every part of the dashboard.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const KEY_TOTAL: &str = "Total";
pub const KEY_HOURLY_TEMP: &str = "hourlyTemp";
pub const KEY_HOURLY_HUMIDITY: &str = "hourlyHumidity";
pub const KEY_HOURLY_WIND: &str = "hourlyWind";

/// String-keyed store every component reads and writes through. Injected so
/// tests can substitute an in-memory fake.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store, used by tests and as a throwaway substrate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// JSON-file-backed store; the binary's durable substrate.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Load existing contents when the file parses; anything else starts
    /// from an empty map.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        match serde_json::to_string_pretty(&*values) {
            Ok(serialized) => {
                if let Err(e) = fs::write(&self.path, serialized) {
                    warn!(path = %self.path.display(), error = %e, "failed to flush state file");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode state file"),
        }
    }
}

/// Typed view over a `KeyValueStore`. A stored value that fails to decode
/// reads as absent; every caller has a default for absence.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        let raw = self.inner.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                debug!(key, "stored value is not a number");
                None
            }
        }
    }

    pub fn set_number(&self, key: &str, value: f64) {
        self.inner.set(key, &value.to_string());
    }

    /// 0/1 flag; anything but a stored "1" reads as 0.
    pub fn get_bool_flag(&self, key: &str) -> u8 {
        match self.inner.get(key).as_deref() {
            Some("1") => 1,
            _ => 0,
        }
    }

    pub fn set_bool_flag(&self, key: &str, value: u8) {
        self.inner.set(key, if value == 1 { "1" } else { "0" });
    }

    /// A stored JSON `null` is the explicit absent marker; malformed JSON
    /// and non-numeric arrays read as absent too.
    pub fn get_json_array(&self, key: &str) -> Option<Vec<f64>> {
        let raw = self.inner.get(key)?;
        match serde_json::from_str::<Option<Vec<f64>>>(&raw) {
            Ok(values) => values,
            Err(_) => {
                debug!(key, "stored value is not a numeric array");
                None
            }
        }
    }

    pub fn set_json_array(&self, key: &str, values: Option<&[f64]>) {
        let raw = match values {
            Some(values) => {
                serde_json::to_string(values).unwrap_or_else(|_| "null".to_string())
            }
            None => "null".to_string(),
        };
        self.inner.set(key, &raw);
    }
}
