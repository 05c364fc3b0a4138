//! Errors that abort a reconciliation pass.

use gqlsync_client::ApiError;
use gqlsync_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The declared configuration is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A remote call failed.
    #[error("remote call failed: {0}")]
    Api(#[from] ApiError),

    /// A template file exists but could not be read.
    #[error("failed to read template {}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
