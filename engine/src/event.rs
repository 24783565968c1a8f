//! Events a host delivers to a synchronizer.

use crate::{Key, Value};
use serde::{Deserialize, Serialize};

/// Something happened on the host side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// The location fragment changed outside the engine (back/forward)
    HashChange,
    /// Change request for a key
    #[serde(rename_all = "camelCase")]
    Set {
        key: Key,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        force_debounce: Option<bool>,
    },
    /// Toggle membership of an array key
    Toggle { key: Key, member: Value },
    /// Reset one key, or everything when `key` is absent
    Reset {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<Key>,
    },
    /// The page is going away
    Unload,
}
