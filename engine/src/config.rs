//! Construction options for a synchronizer.

use crate::{error::Result, Defaults, Error, Key};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Debounce window used when none is configured.
pub const DEFAULT_DELAY_MS: u64 = 100;

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

/// A list of key names, accepting a single name in place of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "Vec<Key>")]
pub struct KeyList(Vec<Key>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Key),
    Many(Vec<Key>),
}

impl From<OneOrMany> for KeyList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(key) => KeyList(vec![key]),
            OneOrMany::Many(keys) => KeyList(keys),
        }
    }
}

impl From<KeyList> for Vec<Key> {
    fn from(list: KeyList) -> Self {
        list.0
    }
}

impl KeyList {
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for KeyList {
    fn from(key: &str) -> Self {
        KeyList(vec![key.to_string()])
    }
}

impl From<Key> for KeyList {
    fn from(key: Key) -> Self {
        KeyList(vec![key])
    }
}

impl<const N: usize> From<[&str; N]> for KeyList {
    fn from(keys: [&str; N]) -> Self {
        KeyList(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl From<Vec<Key>> for KeyList {
    fn from(keys: Vec<Key>) -> Self {
        KeyList(keys)
    }
}

/// Options recognized when attaching a synchronizer.
///
/// JSON form (camelCase):
///
/// ```json
/// {
///   "defaults": {"sortBy": "popularity", "text": ""},
///   "debounce": "text",
///   "immutable": ["rankRange"],
///   "delay": 250
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    /// Key definitions
    pub defaults: Defaults,
    /// Keys whose changes commit after a quiet period
    #[serde(default)]
    pub debounce: KeyList,
    /// Keys whose change requests are ignored
    #[serde(default)]
    pub immutable: KeyList,
    /// Debounce window in milliseconds
    #[serde(default = "default_delay_ms", rename = "delay")]
    pub delay_ms: u64,
    /// Keep default-equal values in the fragment instead of dropping them
    #[serde(default)]
    pub keep_defaults: bool,
}

impl SyncOptions {
    /// Create options with no debounced or immutable keys.
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            debounce: KeyList::default(),
            immutable: KeyList::default(),
            delay_ms: DEFAULT_DELAY_MS,
            keep_defaults: false,
        }
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn debounce(mut self, keys: impl Into<KeyList>) -> Self {
        self.debounce = keys.into();
        self
    }

    pub fn immutable(mut self, keys: impl Into<KeyList>) -> Self {
        self.immutable = keys.into();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn keep_defaults(mut self, keep: bool) -> Self {
        self.keep_defaults = keep;
        self
    }

    /// The debounce window.
    pub fn delay_duration(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn is_debounced(&self, key: &str) -> bool {
        self.debounce.contains(key)
    }

    pub fn is_immutable(&self, key: &str) -> bool {
        self.immutable.contains(key)
    }

    /// Keys named in `debounce` or `immutable` that have no default.
    pub fn undefined_keys(&self) -> Vec<&Key> {
        self.debounce
            .iter()
            .chain(self.immutable.iter())
            .filter(|key| !self.defaults.contains(key))
            .collect()
    }
}
