//! Runtime configuration for registry consumers.

use std::str::FromStr;

use tracing::Level;

use crate::domain::error::{Result, SpectralError};

/// Threshold used by `list_high_stability` when the caller has no opinion.
pub const DEFAULT_STABILITY_THRESHOLD: f64 = 0.8;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by the CLI and embedding applications.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    pub stability_threshold: f64,
    pub log_format: LogFormat,
    pub log_level: Level,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            stability_threshold: DEFAULT_STABILITY_THRESHOLD,
            log_format: LogFormat::Text,
            log_level: Level::INFO,
        }
    }
}

impl RegistryConfig {
    /// Create from environment variables
    ///
    /// Reads:
    /// - SPECTRAL_STABILITY_THRESHOLD (optional, default: 0.8)
    /// - SPECTRAL_LOG_FORMAT (optional, "json" for JSON lines, default: text)
    /// - SPECTRAL_LOG_LEVEL (optional, default: "info")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("SPECTRAL_STABILITY_THRESHOLD") {
            let threshold = raw.trim().parse::<f64>().map_err(|_| {
                SpectralError::Config(format!("SPECTRAL_STABILITY_THRESHOLD={raw}"))
            })?;
            config.stability_threshold = threshold;
        }

        if let Some(raw) = lookup("SPECTRAL_LOG_FORMAT") {
            config.log_format = if raw.trim().eq_ignore_ascii_case("json") {
                LogFormat::Json
            } else {
                LogFormat::Text
            };
        }

        if let Some(raw) = lookup("SPECTRAL_LOG_LEVEL") {
            config.log_level = Level::from_str(raw.trim())
                .map_err(|_| SpectralError::Config(format!("SPECTRAL_LOG_LEVEL={raw}")))?;
        }

        Ok(config)
    }

    pub fn with_stability_threshold(mut self, threshold: f64) -> Self {
        self.stability_threshold = threshold;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }
}
