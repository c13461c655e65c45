//! Diagnostic logging.
//!
//! Everything goes to stderr so stdout stays the calculator conversation.
//! `RUST_LOG` takes precedence over the configured default:
//! ```bash
//! RUST_LOG=debug calculait
//! RUST_LOG=calculait::session=debug calculait
//! ```

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Install the global subscriber. Only the first call takes effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&config.default)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_filter(filter);

        // Another subscriber may already be installed (e.g. by a test harness).
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}
