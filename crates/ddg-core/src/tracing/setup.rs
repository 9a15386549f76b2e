//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the DDG tracing/logging system.
///
/// Reads the `DDG_LOG` environment variable for per-module log levels,
/// e.g. `DDG_LOG=ddg_engine::graph=debug,ddg_engine::transform=info`.
///
/// Falls back to `ddg=info` if `DDG_LOG` is not set or is invalid.
/// Calling it more than once has no further effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("DDG_LOG").unwrap_or_else(|_| EnvFilter::new("ddg=info"));

        // A host may have installed its own subscriber already.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
