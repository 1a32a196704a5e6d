//! Tracing setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an env-filter and fmt layer.
///
/// Safe to call once per process; embedding hosts that install their own
/// subscriber should skip this.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "internsight=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
