//! Configuration error types.

use std::path::PathBuf;

/// Errors raised while loading, saving, or parsing a `terrain.ron` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`crate::Config`].
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Serializing the config back to RON failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),

    /// No platform config directory exists and none was given on the command line.
    #[error("no config directory available on this platform; pass --config")]
    NoConfigDir,
}
