//! FFI layer for embedding hosts (browser glue, webviews, native shells).
//!
//! This module provides C-compatible functions around a synchronizer that
//! uses an in-memory navigation entry and virtual time. The host mirrors the
//! real location into it and replays what comes out:
//!
//! 1. Forward user requests with `fragsync_dispatch` and back/forward
//!    navigation with `fragsync_navigate`.
//! 2. Apply the writes returned by `fragsync_take_writes` to the real location.
//! 3. After each call, read `fragsync_timer`; when it reports a delay, call
//!    `fragsync_advance` once that much time has passed.
//!
//! # Memory Management
//!
//! - Strings returned by `fragsync_*` functions are allocated by Rust
//! - Caller must free them with `fragsync_string_free`
//! - Synchronizer pointers must be freed with `fragsync_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{
    HostEvent, ManualScheduler, MemoryNavigator, Outcome, SyncOptions, Synchronizer,
};
use serde::Serialize;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::time::Duration;

/// Synchronizer as seen from the host.
pub type HostSync = Synchronizer<MemoryNavigator, ManualScheduler>;

/// Result wrapper for FFI responses.
#[derive(Serialize)]
#[serde(untagged)]
enum FfiResult<T: Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// Response to a request that may change state.
#[derive(Serialize)]
struct Dispatched {
    outcome: &'static str,
    state: serde_json::Value,
}

/// Response to `fragsync_advance`.
#[derive(Serialize)]
struct Advanced {
    fired: bool,
    state: serde_json::Value,
}

fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Committed => "committed",
        Outcome::Deferred => "deferred",
        Outcome::Ignored => "ignored",
        Outcome::Rejected(_) => "rejected",
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `fragsync_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        // String contained null bytes - return error JSON
        Err(_) => c"{\"error\":\"string contained null bytes\"}"
            .to_owned()
            .into_raw(),
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn null_sync() -> *mut c_char {
    to_c_string(FfiResult::<()>::err("null synchronizer pointer").to_json())
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create a synchronizer.
///
/// # Arguments
/// - `options_json`: JSON string of SyncOptions
/// - `location`: path and query of the page, or null when the host has no
///   history API
/// - `fragment`: current fragment including `#`, or null for none
///
/// # Returns
/// Pointer to the synchronizer, or null on failure.
///
/// # Safety
/// - All string arguments must be valid null-terminated C strings or null
/// - Caller must free the returned pointer with `fragsync_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_new(
    options_json: *const c_char,
    location: *const c_char,
    fragment: *const c_char,
) -> *mut HostSync {
    let options_str = match from_c_string(options_json) {
        Some(s) => s,
        None => return ptr::null_mut(),
    };

    let options = match SyncOptions::from_json(&options_str) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "rejecting synchronizer options");
            return ptr::null_mut();
        }
    };

    let navigator = match from_c_string(location) {
        Some(location) => MemoryNavigator::new().with_location(location),
        None => MemoryNavigator::new().without_history(),
    };
    let navigator = navigator.with_fragment(from_c_string(fragment).unwrap_or_default());

    Box::into_raw(Box::new(Synchronizer::manual(options, navigator)))
}

/// Free a synchronizer.
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn fragsync_free(sync: *mut HostSync) {
    if !sync.is_null() {
        drop(Box::from_raw(sync));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `fragsync_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn fragsync_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Install the log subscriber (filter read from `FRAGSYNC_LOG`).
///
/// Returns 1 when installed, 0 when a subscriber was already present.
#[no_mangle]
pub extern "C" fn fragsync_init_logging() -> i32 {
    i32::from(crate::logging::init())
}

// ============================================================================
// Requests
// ============================================================================

/// Deliver a host event.
///
/// # Arguments
/// - `event_json`: JSON string of HostEvent, e.g.
///   `{"type": "set", "key": "sortBy", "value": "winrate"}`
///
/// # Returns
/// JSON string: `{"ok": {"outcome": "...", "state": {...}}}` or
/// `{"error": "message"}` when the request was rejected
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new` or null
/// - `event_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `fragsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_dispatch(
    sync: *mut HostSync,
    event_json: *const c_char,
) -> *mut c_char {
    let sync = match sync.as_mut() {
        Some(s) => s,
        None => return null_sync(),
    };

    let event_str = match from_c_string(event_json) {
        Some(s) => s,
        None => return to_c_string(FfiResult::<()>::err("invalid event JSON").to_json()),
    };

    let event: HostEvent = match serde_json::from_str(&event_str) {
        Ok(e) => e,
        Err(e) => {
            return to_c_string(FfiResult::<()>::err(format!("parse error: {}", e)).to_json())
        }
    };

    let outcome = sync.dispatch(event);
    if let Outcome::Rejected(error) = outcome {
        return to_c_string(FfiResult::<()>::err(error.to_string()).to_json());
    }

    to_c_string(
        FfiResult::ok(Dispatched {
            outcome: outcome_name(&outcome),
            state: sync.state().to_json(),
        })
        .to_json(),
    )
}

/// Report an external navigation (back/forward) to a new fragment.
///
/// # Returns
/// JSON string: `{"ok": {"outcome": "...", "state": {...}}}`
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new` or null
/// - `fragment` must be a valid null-terminated C string or null (no fragment)
/// - Caller must free the returned string with `fragsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_navigate(
    sync: *mut HostSync,
    fragment: *const c_char,
) -> *mut c_char {
    let sync = match sync.as_mut() {
        Some(s) => s,
        None => return null_sync(),
    };

    sync.navigator_mut()
        .navigate(from_c_string(fragment).unwrap_or_default());
    let outcome = sync.on_navigation();

    to_c_string(
        FfiResult::ok(Dispatched {
            outcome: outcome_name(&outcome),
            state: sync.state().to_json(),
        })
        .to_json(),
    )
}

/// Move virtual time forward by `elapsed_ms`, committing the debounce
/// window if it is due.
///
/// # Returns
/// JSON string: `{"ok": {"fired": bool, "state": {...}}}`
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new` or null
/// - Caller must free the returned string with `fragsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_advance(sync: *mut HostSync, elapsed_ms: u64) -> *mut c_char {
    let sync = match sync.as_mut() {
        Some(s) => s,
        None => return null_sync(),
    };

    let fired = sync.advance(Duration::from_millis(elapsed_ms));
    to_c_string(
        FfiResult::ok(Advanced {
            fired,
            state: sync.state().to_json(),
        })
        .to_json(),
    )
}

// ============================================================================
// Reads
// ============================================================================

/// Get the flat per-key state.
///
/// # Returns
/// JSON string: `{"ok": {"sortBy": ..., "defaultSortBy": ..., "customSortBy": ..., "canBeReset": ...}}`
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new` or null
/// - Caller must free the returned string with `fragsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_state(sync: *const HostSync) -> *mut c_char {
    let sync = match sync.as_ref() {
        Some(s) => s,
        None => return null_sync(),
    };

    to_c_string(FfiResult::ok(sync.state().to_json()).to_json())
}

/// Drain the navigation writes the host must apply to the real location.
///
/// # Returns
/// JSON string: `{"ok": [{"type": "fragment" | "url", "value": "..."}, ...]}`
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new` or null
/// - Caller must free the returned string with `fragsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_take_writes(sync: *mut HostSync) -> *mut c_char {
    let sync = match sync.as_mut() {
        Some(s) => s,
        None => return null_sync(),
    };

    let writes = sync.navigator_mut().take_writes();
    to_c_string(FfiResult::ok(writes).to_json())
}

/// Get the time left in the debounce window.
///
/// # Returns
/// JSON string: `{"ok": <milliseconds>}` or `{"ok": null}` when no window is open
///
/// # Safety
/// - `sync` must be a valid pointer from `fragsync_new` or null
/// - Caller must free the returned string with `fragsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn fragsync_timer(sync: *const HostSync) -> *mut c_char {
    let sync = match sync.as_ref() {
        Some(s) => s,
        None => return null_sync(),
    };

    let remaining = sync
        .scheduler()
        .remaining()
        .map(|d| d.as_millis() as u64);
    to_c_string(FfiResult::ok(remaining).to_json())
}
