//! Logging setup

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Error, Debug)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Install the global fmt subscriber
///
/// `RUST_LOG` directives take precedence over `level`. Fails instead of
/// panicking when a subscriber is already installed.
pub fn init_tracing(level: Level) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| TelemetryError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_without_panicking() {
        let _ = init_tracing(Level::DEBUG);
        assert!(init_tracing(Level::INFO).is_err());
    }
}
