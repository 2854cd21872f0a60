//! Integration tests for the Driftwood cart engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p driftwood-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Full shopper scenarios against one session
//! - `convergence` - Multi-session eventual consistency over one shared store
//! - `persistence` - Round-trips and recovery through the storage backends

use std::sync::Once;

use driftwood_cart::CartConfig;

static INIT: Once = Once::new();

/// Initialize tracing once per test binary; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Engine config with short debounce windows so paused-time tests advance
/// less simulated time.
#[must_use]
pub fn fast_config() -> CartConfig {
    CartConfig {
        persist_debounce: std::time::Duration::from_millis(30),
        totals_debounce: std::time::Duration::from_millis(10),
        poll_interval: std::time::Duration::from_millis(500),
        event_capacity: 64,
    }
}
