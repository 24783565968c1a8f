//! Navigation context.
//!
//! The location fragment is a window-wide shared resource. The engine never
//! touches it directly; it goes through a [`Navigator`] so hosts can plug in a
//! real browser location and tests can use [`MemoryNavigator`].

use serde::{Deserialize, Serialize};

/// Read and write access to the current navigation entry.
pub trait Navigator {
    /// Current fragment including the leading `#`, or the empty string.
    fn fragment(&self) -> String;

    /// Replace the fragment of the current entry (never pushes a new entry).
    fn replace_fragment(&mut self, fragment: &str);

    /// Path and query of the current entry, or `None` when the host has no
    /// history API to rewrite the URL with.
    fn history_location(&self) -> Option<String> {
        None
    }

    /// Replace the current entry's URL, dropping the fragment.
    fn replace_history(&mut self, _location: &str) {}
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn fragment(&self) -> String {
        (**self).fragment()
    }

    fn replace_fragment(&mut self, fragment: &str) {
        (**self).replace_fragment(fragment)
    }

    fn history_location(&self) -> Option<String> {
        (**self).history_location()
    }

    fn replace_history(&mut self, location: &str) {
        (**self).replace_history(location)
    }
}

/// A write issued against the navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum NavWrite {
    /// Fragment replaced in place
    Fragment(String),
    /// Whole URL replaced through the history API
    Url(String),
}

/// In-memory navigation entry.
///
/// Records every write so callers can assert on them or replay them against
/// a real location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNavigator {
    location: String,
    fragment: String,
    history: bool,
    writes: Vec<NavWrite>,
}

impl MemoryNavigator {
    /// Create an entry at `/` with no fragment and a history API.
    pub fn new() -> Self {
        Self {
            location: "/".to_string(),
            fragment: String::new(),
            history: true,
            writes: Vec::new(),
        }
    }

    /// Builder-style method to set the initial fragment.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = fragment.into();
        self
    }

    /// Builder-style method to set the path and query.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder-style method for hosts without a history API.
    pub fn without_history(mut self) -> Self {
        self.history = false;
        self
    }

    /// Simulate an external navigation (back/forward, typed URL).
    ///
    /// Not recorded as a write.
    pub fn navigate(&mut self, fragment: impl Into<String>) {
        self.fragment = fragment.into();
    }

    /// Full URL of the entry.
    pub fn href(&self) -> String {
        format!("{}{}", self.location, self.fragment)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// All writes so far.
    pub fn writes(&self) -> &[NavWrite] {
        &self.writes
    }

    /// Drain recorded writes.
    pub fn take_writes(&mut self) -> Vec<NavWrite> {
        std::mem::take(&mut self.writes)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for MemoryNavigator {
    fn fragment(&self) -> String {
        self.fragment.clone()
    }

    fn replace_fragment(&mut self, fragment: &str) {
        self.fragment = fragment.to_string();
        self.writes.push(NavWrite::Fragment(fragment.to_string()));
    }

    fn history_location(&self) -> Option<String> {
        self.history.then(|| self.location.clone())
    }

    fn replace_history(&mut self, location: &str) {
        self.location = location.to_string();
        self.fragment.clear();
        self.writes.push(NavWrite::Url(location.to_string()));
    }
}
