use bridge_traits::error::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Failed to fetch remote catalog: {0}")]
    Fetch(#[from] BridgeError),

    #[error("Failed to walk {path:?}: {source}")]
    FilesystemWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Couldn't parse creation time {value:?} of {filename}: {reason}")]
    TimestampParse {
        filename: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate image: {filename}")]
    DuplicateFilename { filename: String },

    #[error("Failed running: {description}: {source}")]
    FilesystemOperation {
        description: String,
        #[source]
        source: BridgeError,
    },

    #[error(transparent)]
    Config(#[from] core_runtime::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

impl MirrorError {
    /// Whether the run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MirrorError::TimestampParse { .. }
                | MirrorError::DuplicateFilename { .. }
                | MirrorError::FilesystemOperation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
