// Logging module for structured logging using the tracing crate

use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber for structured logging
///
/// Events go to stderr so stdout stays free for command output. The level
/// filter comes from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. With
/// `json` set, every event is a single JSON line for log aggregation.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Examples
///
/// ```
/// use bena_watermark::logging::init_subscriber;
///
/// init_subscriber(false).expect("Failed to initialize logging");
/// tracing::info!("Watermarking started");
///
/// // A second call reports the existing subscriber instead of panicking
/// assert!(init_subscriber(false).is_err());
/// ```
pub fn init_subscriber(json: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
