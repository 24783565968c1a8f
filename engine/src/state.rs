//! Exposed state: the per-key projection handed to consumers.
//!
//! Recomputed from the defaults, the live diff and the pending window on
//! every change. It has no identity of its own; consumers that want to skip
//! redundant work compare successive projections themselves.

use crate::{Key, Kind, Value};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// Projection of a single key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyState {
    pub kind: Kind,
    /// Current value: pending, else live, else default
    pub value: Value,
    pub default: Value,
    /// Live value, `None` when the key equals its default
    pub custom: Option<Value>,
    /// A debounced change is waiting to commit
    pub pending: bool,
    pub immutable: bool,
}

/// Projection of every key plus the reset flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedState {
    pub keys: BTreeMap<Key, KeyState>,
    /// True when any key differs from its default
    pub can_be_reset: bool,
}

impl ExposedState {
    pub fn get(&self, key: &str) -> Option<&KeyState> {
        self.keys.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.keys.get(key).map(|k| &k.value)
    }

    pub fn custom(&self, key: &str) -> Option<&Value> {
        self.keys.get(key).and_then(|k| k.custom.as_ref())
    }

    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.keys.get(key).map(|k| &k.default)
    }

    pub fn can_be_reset(&self) -> bool {
        self.can_be_reset
    }

    /// Flat accessor surface: `k`, `defaultK`, `customK` for every key, and
    /// `canBeReset`.
    pub fn to_json(&self) -> Json {
        let mut out = Map::new();
        for (key, state) in &self.keys {
            let suffix = capitalize(key);
            out.insert(key.clone(), to_json(&state.value));
            out.insert(format!("default{}", suffix), to_json(&state.default));
            out.insert(
                format!("custom{}", suffix),
                state.custom.as_ref().map(to_json).unwrap_or(Json::Null),
            );
        }
        out.insert("canBeReset".to_string(), Json::Bool(self.can_be_reset));
        Json::Object(out)
    }
}

/// Accessor suffix for a key: `sortBy` becomes `SortBy`.
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_json(value: &Value) -> Json {
    serde_json::to_value(value).unwrap_or(Json::Null)
}
