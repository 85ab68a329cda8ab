//! Testing utilities for fluxline pipelines.
//!
//! This module provides:
//! - A recording probe stage
//! - Assertions over recorded elements
//! - Tracing setup for tests

mod assertions;
mod recorder;

pub use assertions::{assert_recorded, assert_recorded_len};
pub use recorder::{Record, Recorder};

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that writes through the test harness.
///
/// The filter comes from `RUST_LOG`, defaulting to `fluxline=debug`. Calling
/// it more than once is harmless.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fluxline=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
