use std::{io, path::PathBuf};

use thiserror::Error;

/// Top-level error type used by `uploadgear`.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Malformed multipart input.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A storage backend failed to persist a file.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The body stream ended before the closing boundary.
    #[error("multipart stream ended unexpectedly")]
    IncompleteStream,
    /// A file reached relocation without an in-memory buffer.
    #[error("file in field `{field}` has no buffered content to relocate")]
    MissingBuffer {
        /// Field name of the offending file.
        field: String,
    },
}

/// Multipart parsing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("multipart parse error: {message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    /// Creates a parse error with a human readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure raised while writing uploaded content.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target directory could not be created.
    #[error("failed to create directory `{}`: {source}", path.display())]
    CreateDirectory {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Writing a file failed.
    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The target file already exists and the collision policy rejects it.
    #[error("file `{}` already exists", path.display())]
    FileExists {
        /// Conflicting path.
        path: PathBuf,
    },
    /// No extension is known for the declared content type.
    #[error("no file extension known for content type `{content_type}`")]
    UnknownExtension {
        /// Declared content type.
        content_type: String,
    },
    /// The incoming part stream failed while being consumed.
    ///
    /// The original error is kept so callers can tell client faults from
    /// storage faults.
    #[error("upload stream failed: {0}")]
    Upstream(Box<UploadError>),
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("environment variable `{name}` is not set")]
    MissingVar {
        /// Variable name.
        name: String,
    },
    /// A configured path is empty.
    #[error("`{name}` must not be empty")]
    EmptyPath {
        /// Setting name.
        name: String,
    },
    /// A fixed filename contains path separators or is empty.
    #[error("invalid fixed filename `{name}`")]
    InvalidFilename {
        /// Rejected filename.
        name: String,
    },
}
