use std::path::PathBuf;

use thiserror::Error;

use crate::batch::ConfigError;
use crate::io;

/// Errors that stop processing of a directory, or of the whole run when
/// raised before any directory is touched.
#[derive(Debug, Error)]
pub enum Error {
    /// A file a step depends on was not produced by an earlier step.
    #[error("{what} not found at {}", path.display())]
    MissingInputArtifact { what: &'static str, path: PathBuf },

    #[error("source path {} does not exist or is not a directory", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.into())
    }
}

impl Error {
    pub fn missing_input(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::MissingInputArtifact {
            what,
            path: path.into(),
        }
    }
}
