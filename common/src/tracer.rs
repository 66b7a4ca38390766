//! Installs the global tracing subscriber used by the binaries.
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid log filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Cannot install tracing subscriber: {0}")]
    Install(String),
}

/// Installs a formatting subscriber.
///
/// The filter is taken from the `RUST_LOG` environment variable when it is set,
/// otherwise `default_directive` is used, e.g. `"info"` or `"pulsar_profile=debug"`.
pub fn init_tracer(default_directive: &str) -> Result<(), TracerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TracerError::Install(e.to_string()))?;
    debug!("Tracer initialised");
    Ok(())
}
