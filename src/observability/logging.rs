//! # Logging
//!
//! `tracing` subscriber setup. `RUST_LOG` wins when set; otherwise the
//! configured level applies to this crate only.

use crate::constants::LOG_TARGET;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, before any reconciliation.
pub fn init_tracing(log_level: &str, log_format: &str, enable_color: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(log_level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if log_format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.with_ansi(enable_color).try_init()
    };

    result
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize tracing subscriber")
}

fn default_filter(log_level: &str) -> String {
    format!("{LOG_TARGET}={}", log_level.trim().to_lowercase())
}
