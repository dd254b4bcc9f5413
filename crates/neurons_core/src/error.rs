use std::path::PathBuf;

use thiserror::Error;

/// Color parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{param} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        param: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
