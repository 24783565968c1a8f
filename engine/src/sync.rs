//! Synchronizer - keeps typed key state and the location fragment in step.
//!
//! The synchronizer holds the live diff (keys that differ from their
//! defaults, stored in fragment form) and the debounce window (typed values
//! waiting for the shared timer). On [`Synchronizer::set_with`], debounced
//! keys park in the window and everything else commits directly and writes
//! the fragment back. External navigation re-derives the live diff from the
//! new fragment.
//!
//! No request ever fails loudly. Invalid requests are logged and reported as
//! [`Outcome::Rejected`]; requests against immutable keys are dropped.

use crate::codec::{self, FragmentMap};
use crate::value::ARRAY_SEPARATOR;
use crate::{
    Error, ExposedState, HostEvent, Key, KeyState, ManualScheduler, Navigator, Scheduler,
    SyncOptions, Value,
};
use std::fmt;
use std::time::Duration;

/// What happened to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Applied to the live diff (the fragment is rewritten if it changed)
    Committed,
    /// Parked in the debounce window
    Deferred,
    /// Dropped by policy: immutable key or detached synchronizer
    Ignored,
    /// Dropped because the request was invalid
    Rejected(Error),
}

impl Outcome {
    /// Whether the request changed (or will change) state.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Committed | Outcome::Deferred)
    }
}

/// Handle returned by [`Synchronizer::subscribe`].
pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&ExposedState)>;

/// Bidirectional binding between typed key state and a location fragment.
pub struct Synchronizer<N, S = ManualScheduler> {
    options: SyncOptions,
    navigator: N,
    scheduler: S,
    /// Minimal diff from defaults, in fragment form
    live: FragmentMap,
    /// Debounce window, in request order
    pending: Vec<(Key, Value)>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
    detached: bool,
}

impl<N: Navigator, S: Scheduler> Synchronizer<N, S> {
    /// Attach to a navigation entry, deriving state from its fragment.
    pub fn new(options: SyncOptions, navigator: N, scheduler: S) -> Self {
        for key in options.undefined_keys() {
            tracing::warn!(%key, "configured key has no default, ignoring");
        }

        let mut sync = Self {
            options,
            navigator,
            scheduler,
            live: FragmentMap::new(),
            pending: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            detached: false,
        };
        let fragment = sync.navigator.fragment();
        sync.live = sync.derive(&fragment);
        sync
    }

    /// Derive a live diff from a fragment.
    ///
    /// Keeps only keys that have a default and are not immutable. Unless
    /// defaults are kept explicitly, values equal to their default are
    /// dropped too.
    pub fn derive(&self, fragment: &str) -> FragmentMap {
        let mut live = codec::parse(fragment);
        live.retain(|key, raw| {
            let Some(spec) = self.options.defaults.get(key) else {
                return false;
            };
            if self.options.is_immutable(key) {
                return false;
            }
            self.options.keep_defaults || spec.stringify(&spec.cast(raw)).is_some()
        });
        live
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fresh projection of every key.
    pub fn state(&self) -> ExposedState {
        let keys = self
            .options
            .defaults
            .iter()
            .map(|(key, spec)| {
                let custom = self.live.get(key).map(|raw| spec.cast(raw));
                let pending = self.pending_value(key);
                let value = pending
                    .cloned()
                    .or_else(|| custom.clone())
                    .unwrap_or_else(|| spec.default_value().clone());
                let state = KeyState {
                    kind: spec.kind(),
                    value,
                    default: spec.default_value().clone(),
                    custom,
                    pending: pending.is_some(),
                    immutable: self.options.is_immutable(key),
                };
                (key.clone(), state)
            })
            .collect();

        ExposedState {
            keys,
            can_be_reset: self.can_be_reset(),
        }
    }

    /// Current value of a key: pending, else live, else default.
    pub fn value(&self, key: &str) -> Option<Value> {
        let spec = self.options.defaults.get(key)?;
        if let Some(value) = self.pending_value(key) {
            return Some(value.clone());
        }
        Some(
            self.live
                .get(key)
                .map(|raw| spec.cast(raw))
                .unwrap_or_else(|| spec.default_value().clone()),
        )
    }

    /// Live value of a key, `None` when it equals the default.
    pub fn custom(&self, key: &str) -> Option<Value> {
        let spec = self.options.defaults.get(key)?;
        self.live.get(key).map(|raw| spec.cast(raw))
    }

    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.options.defaults.get(key).map(|spec| spec.default_value())
    }

    /// True when any key differs from its default.
    pub fn can_be_reset(&self) -> bool {
        !self.live.is_empty()
    }

    /// The live diff in fragment form.
    pub fn live(&self) -> &FragmentMap {
        &self.live
    }

    /// Keys waiting in the debounce window.
    pub fn pending_keys(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending_value(key).is_some()
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    // ------------------------------------------------------------------
    // Change requests
    // ------------------------------------------------------------------

    /// Set a key using its configured debounce behaviour.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Outcome {
        self.set_with(key, value, None)
    }

    /// Set a key, optionally overriding whether the change is debounced.
    pub fn set_with(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        force_debounce: Option<bool>,
    ) -> Outcome {
        let outcome = self.apply(key, value.into(), force_debounce);
        if outcome.is_accepted() {
            self.notify();
        }
        outcome
    }

    /// Set a key and run `callback` with the updated projection once the
    /// request is accepted.
    pub fn set_and_then(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        force_debounce: Option<bool>,
        callback: impl FnOnce(&ExposedState),
    ) -> Outcome {
        let outcome = self.set_with(key, value, force_debounce);
        if outcome.is_accepted() {
            callback(&self.state());
        }
        outcome
    }

    /// Add `member` to an array key, or remove it if already present.
    ///
    /// The member is cast to the key's member kind before comparing, so
    /// `"3"` and `3` toggle the same entry of a `number[]` key. String
    /// members containing the array separator are rejected.
    pub fn toggle(&mut self, key: &str, member: impl Into<Value>) -> Outcome {
        if self.detached {
            return Outcome::Ignored;
        }
        let Some(spec) = self.options.defaults.get(key) else {
            return self.reject(Error::UnknownKey(key.to_string()));
        };
        let Some(element) = spec.kind().element() else {
            return self.reject(Error::NotAnArray(key.to_string()));
        };
        if self.options.is_immutable(key) {
            return Outcome::Ignored;
        }

        let member = element.coerce(member.into());
        if let Value::Str(text) = &member {
            if text.contains(ARRAY_SEPARATOR) {
                return self.reject(Error::SeparatorInMember {
                    key: key.to_string(),
                    member: text.clone(),
                });
            }
        }
        let mut members = match self.value(key) {
            Some(Value::Array(members)) => members,
            _ => Vec::new(),
        };
        match members.iter().position(|m| *m == member) {
            Some(index) => {
                members.remove(index);
            }
            None => members.push(member),
        }

        self.set_with(key, Value::Array(members), None)
    }

    /// Toggle and run `callback` with the updated projection once accepted.
    pub fn toggle_and_then(
        &mut self,
        key: &str,
        member: impl Into<Value>,
        callback: impl FnOnce(&ExposedState),
    ) -> Outcome {
        let outcome = self.toggle(key, member);
        if outcome.is_accepted() {
            callback(&self.state());
        }
        outcome
    }

    /// Reset one key, or every key when `key` is `None`.
    ///
    /// Pending values for the reset keys are discarded.
    pub fn reset(&mut self, key: Option<&str>) -> Outcome {
        if self.detached {
            return Outcome::Ignored;
        }

        let previous = self.live.clone();
        match key {
            None => {
                self.live.clear();
                self.pending.clear();
                self.scheduler.cancel();
            }
            Some(key) => {
                if !self.options.defaults.contains(key) {
                    return self.reject(Error::UnknownKey(key.to_string()));
                }
                self.live.remove(key);
                self.clear_pending(key);
                if self.pending.is_empty() {
                    self.scheduler.cancel();
                }
            }
        }

        self.write_back(&previous);
        self.notify();
        Outcome::Committed
    }

    /// Commit the debounce window.
    ///
    /// Called when the shared timer fires. Every pending key commits with its
    /// last value, then the fragment is written back once.
    pub fn flush(&mut self) {
        self.scheduler.cancel();
        if self.pending.is_empty() {
            return;
        }

        let previous = self.live.clone();
        let pending = std::mem::take(&mut self.pending);
        tracing::trace!(keys = pending.len(), "committing debounce window");
        for (key, value) in pending {
            self.commit(&key, value);
        }

        self.write_back(&previous);
        self.notify();
    }

    /// Absorb an external navigation: the new fragment replaces the live
    /// diff wholesale.
    pub fn on_navigation(&mut self) -> Outcome {
        if self.detached {
            return Outcome::Ignored;
        }

        let fragment = self.navigator.fragment();
        self.live = self.derive(&fragment);
        tracing::debug!(%fragment, keys = self.live.len(), "absorbed external navigation");

        self.notify();
        Outcome::Committed
    }

    /// Route a host event to the matching operation.
    pub fn dispatch(&mut self, event: HostEvent) -> Outcome {
        match event {
            HostEvent::HashChange => self.on_navigation(),
            HostEvent::Set {
                key,
                value,
                force_debounce,
            } => self.set_with(&key, value, force_debounce),
            HostEvent::Toggle { key, member } => self.toggle(&key, member),
            HostEvent::Reset { key } => self.reset(key.as_deref()),
            HostEvent::Unload => {
                self.detach();
                Outcome::Ignored
            }
        }
    }

    /// Release everything tied to the page: the timer, pending values and
    /// listeners. Later requests are ignored.
    pub fn detach(&mut self) {
        self.scheduler.cancel();
        self.pending.clear();
        self.listeners.clear();
        self.detached = true;
        tracing::debug!("synchronizer detached");
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register a listener called with the fresh projection after every
    /// state change.
    pub fn subscribe(&mut self, listener: impl FnMut(&ExposedState) + 'static) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn apply(&mut self, key: &str, value: Value, force_debounce: Option<bool>) -> Outcome {
        if self.detached {
            return Outcome::Ignored;
        }
        let Some(spec) = self.options.defaults.get(key) else {
            return self.reject(Error::UnknownKey(key.to_string()));
        };
        if self.options.is_immutable(key) {
            return Outcome::Ignored;
        }

        let value = spec.kind().coerce(value);
        let debounce = force_debounce.unwrap_or_else(|| self.options.is_debounced(key));

        if debounce {
            self.set_pending(key, value);
            self.scheduler.arm(self.options.delay_duration());
            tracing::trace!(key, delay_ms = self.options.delay_ms, "debounce window armed");
            Outcome::Deferred
        } else {
            let previous = self.live.clone();
            self.commit(key, value);
            if self.pending.is_empty() {
                self.scheduler.cancel();
            }
            self.write_back(&previous);
            Outcome::Committed
        }
    }

    /// Write a value into the live diff. Supersedes any pending value for
    /// the key.
    fn commit(&mut self, key: &str, value: Value) {
        self.clear_pending(key);
        let Some(spec) = self.options.defaults.get(key) else {
            return;
        };

        let raw = if self.options.keep_defaults {
            Some(spec.kind().render(&value))
        } else if value == *spec.default_value() {
            None
        } else {
            spec.stringify(&value)
        };

        match raw {
            Some(raw) => {
                self.live.insert(key, raw);
            }
            None => {
                self.live.remove(key);
            }
        }
    }

    /// Rewrite the fragment from the live diff.
    ///
    /// Starts from the current fragment so foreign keys survive, overlays the
    /// live diff and removes keys that left it since `previous`. A fragment
    /// without key-value pairs (blank, sentinel or a plain anchor) is left
    /// alone while the diff stays empty. Returns whether anything was written.
    fn write_back(&mut self, previous: &FragmentMap) -> bool {
        let current = self.navigator.fragment();
        let mut target = codec::parse(&current);
        let had_pairs = !target.is_empty();
        for (key, raw) in self.live.iter() {
            target.insert(key, raw);
        }
        for key in previous.keys() {
            if !self.live.contains_key(key) {
                target.remove(key);
            }
        }

        let encoded = codec::encode(&target);
        if encoded == current {
            tracing::trace!(fragment = %encoded, "fragment unchanged");
            return false;
        }
        if target.is_empty() && !had_pairs {
            return false;
        }

        self.navigator.replace_fragment(&encoded);
        tracing::debug!(fragment = %encoded, "fragment replaced");

        if target.is_empty() {
            if let Some(location) = self.navigator.history_location() {
                self.navigator.replace_history(&location);
                tracing::debug!(%location, "fragment dropped from URL");
            }
        }

        true
    }

    fn reject(&self, error: Error) -> Outcome {
        tracing::error!(%error, "dropping change request");
        Outcome::Rejected(error)
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let state = self.state();
        for (_, listener) in &mut self.listeners {
            listener(&state);
        }
    }

    fn pending_value(&self, key: &str) -> Option<&Value> {
        self.pending
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    fn set_pending(&mut self, key: &str, value: Value) {
        match self.pending.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pending.push((key.to_string(), value)),
        }
    }

    fn clear_pending(&mut self, key: &str) {
        self.pending.retain(|(k, _)| k != key);
    }
}

impl<N: Navigator> Synchronizer<N, ManualScheduler> {
    /// Attach with a virtual-time scheduler.
    pub fn manual(options: SyncOptions, navigator: N) -> Self {
        Self::new(options, navigator, ManualScheduler::new())
    }

    /// Move virtual time forward, committing the debounce window if its
    /// deadline passes. Returns whether it fired.
    pub fn advance(&mut self, by: Duration) -> bool {
        if self.scheduler.advance(by) {
            self.flush();
            true
        } else {
            false
        }
    }
}

impl<N: fmt::Debug, S: fmt::Debug> fmt::Debug for Synchronizer<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("options", &self.options)
            .field("navigator", &self.navigator)
            .field("scheduler", &self.scheduler)
            .field("live", &self.live)
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .field("detached", &self.detached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Defaults, Kind, MemoryNavigator, NavWrite, ScalarKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS: Duration = Duration::from_millis(1);

    fn test_options() -> SyncOptions {
        let defaults = Defaults::new()
            .with("sortBy", "popularity")
            .with("text", "")
            .with("showAll", false)
            .with("rankRange", "ALL")
            .with_kind("cost", Kind::Array(ScalarKind::Number), Vec::<Value>::new())
            .unwrap();
        SyncOptions::new(defaults)
            .debounce("text")
            .immutable("rankRange")
    }

    fn test_sync(fragment: &str) -> Synchronizer<MemoryNavigator> {
        Synchronizer::manual(
            test_options(),
            MemoryNavigator::new().with_fragment(fragment),
        )
    }

    #[test]
    fn derive_filters_foreign_and_immutable_keys() {
        let sync = test_sync("#sortBy=winrate&rankRange=LEGEND&utm=x&cost=3");
        let keys: Vec<_> = sync.live().keys().collect();
        assert_eq!(keys, vec!["sortBy", "cost"]);
        assert_eq!(sync.value("rankRange"), Some(Value::from("ALL")));
        assert_eq!(sync.value("cost"), Some(Value::from(vec![3])));
    }

    #[test]
    fn derive_drops_default_equal_values() {
        let sync = test_sync("#sortBy=popularity&showAll=0");
        assert!(sync.live().is_empty());
        assert!(!sync.can_be_reset());
    }

    #[test]
    fn unknown_key_is_rejected_without_side_effects() {
        let mut sync = test_sync("");
        let outcome = sync.set("nope", "x");
        assert_eq!(outcome, Outcome::Rejected(Error::UnknownKey("nope".into())));
        assert!(sync.live().is_empty());
        assert!(sync.navigator().writes().is_empty());
    }

    #[test]
    fn immutable_key_is_ignored() {
        let mut sync = test_sync("");
        assert_eq!(sync.set("rankRange", "LEGEND_ONLY"), Outcome::Ignored);
        assert_eq!(sync.custom("rankRange"), None);
        assert_eq!(
            sync.toggle("rankRange", "x"),
            Outcome::Rejected(Error::NotAnArray("rankRange".into()))
        );
    }

    #[test]
    fn direct_commit_writes_fragment() {
        let mut sync = test_sync("");
        assert_eq!(sync.set("showAll", true), Outcome::Committed);
        assert_eq!(sync.live().get("showAll"), Some("yes"));
        assert_eq!(sync.navigator().fragment(), "#showAll=yes");
        assert_eq!(sync.custom("showAll"), Some(Value::Bool(true)));
    }

    #[test]
    fn values_are_coerced_to_key_kind() {
        let mut sync = test_sync("");
        sync.set("cost", "3,5");
        assert_eq!(sync.value("cost"), Some(Value::from(vec![3, 5])));
        assert_eq!(sync.live().get("cost"), Some("3,5"));
    }

    #[test]
    fn debounced_values_wait_for_timer() {
        let mut sync = test_sync("");
        assert_eq!(sync.set("text", "a"), Outcome::Deferred);
        assert!(sync.is_pending("text"));
        assert_eq!(sync.value("text"), Some(Value::from("a")));
        assert_eq!(sync.custom("text"), None);
        assert!(sync.navigator().writes().is_empty());

        assert!(!sync.advance(99 * MS));
        assert!(sync.advance(MS));
        assert!(!sync.is_pending("text"));
        assert_eq!(sync.custom("text"), Some(Value::from("a")));
        assert_eq!(sync.navigator().fragment(), "#text=a");
    }

    #[test]
    fn forced_debounce_overrides_configuration() {
        let mut sync = test_sync("");
        assert_eq!(sync.set_with("text", "now", Some(false)), Outcome::Committed);
        assert_eq!(sync.live().get("text"), Some("now"));

        assert_eq!(sync.set_with("sortBy", "winrate", Some(true)), Outcome::Deferred);
        assert!(sync.live().get("sortBy").is_none());
        sync.advance(100 * MS);
        assert_eq!(sync.live().get("sortBy"), Some("winrate"));
    }

    #[test]
    fn direct_commit_supersedes_pending_value() {
        let mut sync = test_sync("");
        sync.set("text", "typing");
        sync.set_with("text", "final", Some(false));
        assert!(!sync.is_pending("text"));
        assert!(!sync.advance(100 * MS));
        assert_eq!(sync.live().get("text"), Some("final"));
    }

    #[test]
    fn window_commits_all_keys_with_one_write() {
        let mut sync = test_sync("");
        sync.set("text", "a");
        sync.set_with("sortBy", "winrate", Some(true));
        sync.set("text", "ab");
        assert_eq!(sync.pending_keys().collect::<Vec<_>>(), vec!["text", "sortBy"]);
        sync.advance(100 * MS);

        assert_eq!(sync.pending_keys().count(), 0);
        assert_eq!(sync.live().get("text"), Some("ab"));
        assert_eq!(sync.live().get("sortBy"), Some("winrate"));
        assert_eq!(
            sync.navigator().writes(),
            &[NavWrite::Fragment("#text=ab&sortBy=winrate".into())]
        );
    }

    #[test]
    fn write_back_keeps_foreign_keys() {
        let mut sync = test_sync("#utm=mail&rankRange=LEGEND");
        sync.set("sortBy", "winrate");
        assert_eq!(
            sync.navigator().fragment(),
            "#utm=mail&rankRange=LEGEND&sortBy=winrate"
        );

        sync.set("sortBy", "popularity");
        assert_eq!(sync.navigator().fragment(), "#utm=mail&rankRange=LEGEND");
    }

    #[test]
    fn write_back_skips_unchanged_fragment() {
        let mut sync = test_sync("#sortBy=winrate");
        sync.set("sortBy", "winrate");
        assert!(sync.navigator().writes().is_empty());
    }

    #[test]
    fn reset_single_key() {
        let mut sync = test_sync("#sortBy=winrate&showAll=yes");
        assert_eq!(sync.reset(Some("showAll")), Outcome::Committed);
        assert_eq!(sync.navigator().fragment(), "#sortBy=winrate");
        assert!(sync.can_be_reset());
    }

    #[test]
    fn reset_discards_pending_window() {
        let mut sync = test_sync("");
        sync.set("text", "abc");
        sync.reset(None);
        assert!(!sync.scheduler().is_armed());
        assert!(!sync.advance(100 * MS));
        assert_eq!(sync.value("text"), Some(Value::from("")));
    }

    #[test]
    fn reset_unknown_key_is_rejected() {
        let mut sync = test_sync("#sortBy=winrate");
        assert!(matches!(
            sync.reset(Some("nope")),
            Outcome::Rejected(Error::UnknownKey(_))
        ));
        assert_eq!(sync.live().get("sortBy"), Some("winrate"));
    }

    #[test]
    fn reset_without_history_leaves_sentinel() {
        let mut sync = Synchronizer::manual(
            test_options(),
            MemoryNavigator::new()
                .with_fragment("#sortBy=winrate")
                .without_history(),
        );
        sync.reset(None);
        sync.reset(None);
        assert_eq!(sync.navigator().fragment(), "#_");
        assert_eq!(sync.navigator().writes(), &[NavWrite::Fragment("#_".into())]);
    }

    #[test]
    fn external_navigation_replaces_live_state() {
        let mut sync = test_sync("#sortBy=winrate&showAll=yes");
        sync.navigator_mut().navigate("#cost=1,2");
        assert_eq!(sync.on_navigation(), Outcome::Committed);

        let keys: Vec<_> = sync.live().keys().collect();
        assert_eq!(keys, vec!["cost"]);
        assert_eq!(sync.value("sortBy"), Some(Value::from("popularity")));
        assert!(sync.navigator().writes().is_empty());
    }

    #[test]
    fn toggle_normalizes_member_kind() {
        let mut sync = test_sync("");
        sync.toggle("cost", 3);
        sync.toggle("cost", "3");
        assert!(sync.live().is_empty());
    }

    #[test]
    fn toggle_rejects_member_with_separator() {
        let defaults = Defaults::new().with("tags", vec!["x"]);
        let mut sync = Synchronizer::manual(SyncOptions::new(defaults), MemoryNavigator::new());

        let outcome = sync.toggle("tags", "a,b");
        assert!(matches!(
            outcome,
            Outcome::Rejected(Error::SeparatorInMember { ref key, ref member })
                if key == "tags" && member == "a,b"
        ));
        assert!(sync.live().is_empty());

        sync.toggle("tags", "a");
        sync.toggle("tags", "a");
        assert!(sync.live().is_empty());
    }

    #[test]
    fn keep_defaults_writes_explicit_default() {
        let options = test_options().keep_defaults(true);
        let mut sync = Synchronizer::manual(options, MemoryNavigator::new());
        sync.set("sortBy", "popularity");
        assert_eq!(sync.live().get("sortBy"), Some("popularity"));
        assert_eq!(sync.navigator().fragment(), "#sortBy=popularity");
        assert!(sync.can_be_reset());
    }

    #[test]
    fn listeners_see_every_change() {
        let mut sync = test_sync("");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = sync.subscribe(move |state| {
            sink.borrow_mut().push(state.value("sortBy").cloned());
        });

        sync.set("sortBy", "winrate");
        sync.set("nope", 1);
        sync.set("rankRange", "x");
        sync.reset(None);
        assert!(sync.unsubscribe(id));
        sync.set("sortBy", "decks");

        assert_eq!(
            *seen.borrow(),
            vec![Some(Value::from("winrate")), Some(Value::from("popularity"))]
        );
        assert!(!sync.unsubscribe(id));
    }

    #[test]
    fn callbacks_run_only_for_accepted_requests() {
        let mut sync = test_sync("");
        let mut calls = 0;
        sync.set_and_then("sortBy", "winrate", None, |state| {
            assert_eq!(state.custom("sortBy"), Some(&Value::from("winrate")));
            calls += 1;
        });
        sync.set_and_then("rankRange", "x", None, |_| calls += 1);
        sync.toggle_and_then("cost", 4, |state| {
            assert!(state.can_be_reset());
            calls += 1;
        });
        assert_eq!(calls, 2);
    }

    #[test]
    fn dispatch_routes_events() {
        let mut sync = test_sync("");
        let outcome = sync.dispatch(HostEvent::Set {
            key: "sortBy".into(),
            value: Value::from("winrate"),
            force_debounce: None,
        });
        assert_eq!(outcome, Outcome::Committed);

        let outcome = sync.dispatch(HostEvent::Toggle {
            key: "cost".into(),
            member: Value::from(2),
        });
        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(sync.live().get("cost"), Some("2"));

        assert_eq!(sync.dispatch(HostEvent::Reset { key: None }), Outcome::Committed);
        assert!(sync.live().is_empty());
    }

    #[test]
    fn detach_releases_everything() {
        let mut sync = test_sync("");
        sync.set("text", "abc");
        sync.subscribe(|_| panic!("listener called after detach"));
        assert_eq!(sync.dispatch(HostEvent::Unload), Outcome::Ignored);

        assert!(sync.is_detached());
        assert!(!sync.scheduler().is_armed());
        assert_eq!(sync.set("sortBy", "winrate"), Outcome::Ignored);
        assert_eq!(sync.on_navigation(), Outcome::Ignored);
        assert!(sync.navigator().writes().is_empty());
    }
}
