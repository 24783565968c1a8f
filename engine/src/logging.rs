//! Log subscriber setup for hosts that don't bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "FRAGSYNC_LOG";

const DEFAULT_FILTER: &str = "fragsync_engine=info";

/// Install a global fmt subscriber filtered by `FRAGSYNC_LOG`.
///
/// Returns false when a global subscriber is already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
