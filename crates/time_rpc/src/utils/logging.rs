use tracing_subscriber::{EnvFilter, prelude::*};

use crate::core::error::{TimeRpcError, TimeRpcResult};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info,rmcp=warn";

/// Initialize logging to stderr
///
/// # Environment Variables
/// - `RUST_LOG`: Controls logging verbosity (trace, debug, info, warn, error).
///   Falls back to `info` for this crate with the RPC framework at `warn`.
///
/// # Returns
/// - `Ok(())` if logging is successfully initialized
/// - `Err(TimeRpcError::LoggingInitialization)` if a global subscriber is
///   already installed
pub fn init_logging() -> TimeRpcResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| TimeRpcError::LoggingInitialization(e.to_string()))?;

    Ok(())
}
