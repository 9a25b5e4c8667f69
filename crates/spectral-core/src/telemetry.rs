//! Log output for the `spectral` binary.
//!
//! `spectral snapshot` and `spectral digest` write records and digests to
//! stdout, so every log line goes to stderr. The format and default level
//! come from `SPECTRAL_LOG_FORMAT` / `SPECTRAL_LOG_LEVEL` via
//! [`RegistryConfig`]; `RUST_LOG`, when set, overrides the level.

use tracing::Level;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, RegistryConfig};

type StderrLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

fn stderr_layer(json: bool) -> StderrLayer {
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Install the process-wide subscriber; `json` selects JSON lines, `level`
/// applies when `RUST_LOG` is unset.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is left alone.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer(json))
        .try_init()
        .is_ok()
}

pub fn init_from_config(config: &RegistryConfig) -> bool {
    init_tracing(config.log_format == LogFormat::Json, config.log_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        init_from_config(&RegistryConfig::default());
        assert!(!init_tracing(true, Level::DEBUG));
    }
}
