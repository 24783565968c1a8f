//! # Fragsync Engine
//!
//! Keeps a set of typed, named UI state values in step with the location
//! fragment (`#sortBy=winrate&cost=3,5`), so filter and sort state survives
//! reloads, can be shared as a link and follows back/forward navigation.
//!
//! ## Design Principles
//!
//! - **Minimal fragment**: only keys that differ from their defaults are written
//! - **Never loud**: invalid requests are logged and dropped, never panicked on
//! - **Shared fragment**: keys owned by someone else survive every write
//! - **Pluggable IO**: the location and the timer sit behind traits
//!
//! ## Core Concepts
//!
//! ### Defaults
//!
//! Every key is declared with a default value, and the default fixes the key's
//! [`Kind`]: `bool`, `number`, `string` or an array of one of those. Values
//! read from the fragment are cast back to that kind.
//!
//! ### Live diff and debounce window
//!
//! The [`Synchronizer`] holds the live diff (keys that differ from their
//! defaults) and a debounce window for keys configured as debounced. One shared
//! timer commits the whole window at once.
//!
//! ### Navigation
//!
//! The [`Navigator`] trait abstracts the location. [`MemoryNavigator`] keeps
//! the entry in memory and records every write.
//!
//! ## Quick Start
//!
//! ```rust
//! use fragsync_engine::{Defaults, MemoryNavigator, SyncOptions, Synchronizer, Value};
//! use std::time::Duration;
//!
//! // 1. Declare keys
//! let defaults = Defaults::new()
//!     .with("sortBy", "popularity")
//!     .with("text", "")
//!     .with("showAll", false);
//! let options = SyncOptions::new(defaults).debounce("text");
//!
//! // 2. Attach to a navigation entry
//! let navigator = MemoryNavigator::new().with_fragment("#sortBy=winrate");
//! let mut sync = Synchronizer::manual(options, navigator);
//! assert_eq!(sync.value("sortBy"), Some(Value::from("winrate")));
//!
//! // 3. Change state
//! sync.set("showAll", true);
//! sync.set("text", "arena");
//! sync.advance(Duration::from_millis(100));
//!
//! assert_eq!(
//!     sync.navigator().href(),
//!     "/#sortBy=winrate&showAll=yes&text=arena"
//! );
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for embedding hosts.
//! All data is exchanged as JSON strings.
//!
//! ## Runtime
//!
//! With the `runtime` feature (on by default), [`driver::run`] drives a
//! synchronizer from a tokio channel of [`HostEvent`]s with a real timer.

pub mod codec;
pub mod config;
pub mod defaults;
#[cfg(feature = "runtime")]
pub mod driver;
pub mod error;
pub mod event;
pub mod ffi;
pub mod logging;
pub mod navigation;
pub mod scheduler;
pub mod state;
pub mod sync;
pub mod value;

// Re-export main types at crate root
pub use codec::FragmentMap;
pub use config::{KeyList, SyncOptions, DEFAULT_DELAY_MS};
pub use defaults::{DefaultValue, Defaults, KeySpec};
#[cfg(feature = "runtime")]
pub use driver::{EventReceiver, EventSender, TokioScheduler};
pub use error::{Error, Result};
pub use event::HostEvent;
pub use navigation::{MemoryNavigator, NavWrite, Navigator};
pub use scheduler::{ManualScheduler, Scheduler};
pub use state::{ExposedState, KeyState};
pub use sync::{ListenerId, Outcome, Synchronizer};
pub use value::{Kind, ScalarKind, Value};

/// Name of a synchronized state key
pub type Key = String;
