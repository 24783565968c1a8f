//! Fragment codec.
//!
//! Pure translation between a location fragment (`#k1=v1&k2=v2`) and a flat
//! key to string map. Keys and values are percent-encoded independently.
//! An empty map encodes to the `#_` sentinel, which parses back to nothing.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Fragment written when there is nothing to encode.
pub const EMPTY_FRAGMENT: &str = "#_";

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Insertion-ordered key to string map.
///
/// Re-inserting an existing key overwrites its value in place, so the first
/// occurrence decides the position and the last one decides the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentMap {
    entries: Vec<(String, String)>,
}

impl FragmentMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Keep only the entries matching the predicate.
    pub fn retain(&mut self, mut f: impl FnMut(&str, &str) -> bool) {
        self.entries.retain(|(k, v)| f(k, v));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FragmentMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FragmentMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for FragmentMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parse a location fragment into a key to string map.
///
/// Anything not starting with `#`, or without a single `=`, parses to an
/// empty map. Each `&`-separated part is split on its first `=` only.
/// Parts without `=`, with an empty key, or that do not decode to UTF-8 are
/// skipped. Later duplicates overwrite earlier ones.
pub fn parse(fragment: &str) -> FragmentMap {
    let mut map = FragmentMap::new();

    let Some(body) = fragment.strip_prefix('#') else {
        return map;
    };
    if !body.contains('=') {
        return map;
    }

    for part in body.split('&') {
        let Some((raw_key, raw_value)) = part.split_once('=') else {
            tracing::trace!(part, "skipping fragment segment without '='");
            continue;
        };
        if raw_key.is_empty() {
            tracing::trace!(part, "skipping fragment segment with empty key");
            continue;
        }
        match (decode(raw_key), decode(raw_value)) {
            (Some(key), Some(value)) => {
                map.insert(key, value);
            }
            _ => tracing::trace!(part, "skipping undecodable fragment segment"),
        }
    }

    map
}

/// Encode a key to string map as a location fragment.
pub fn encode(map: &FragmentMap) -> String {
    if map.is_empty() {
        return EMPTY_FRAGMENT.to_string();
    }

    let pairs: Vec<String> = map
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect();

    format!("#{}", pairs.join("&"))
}

fn decode(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
