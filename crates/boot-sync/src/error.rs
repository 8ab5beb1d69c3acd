//! Error types for boot-sync

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using boot-sync's error type
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised while pushing or pulling a tree
#[derive(Error, Debug)]
pub enum SyncError {
    /// Local filesystem failure (open/read/write/mkdir)
    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failure
    #[error("Failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Envelope text is not valid base64
    #[error("Failed to decode envelope: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The key-management service rejected an encrypt or decrypt call
    #[error("KMS {operation} failed: {message}")]
    Kms {
        operation: &'static str,
        message: String,
    },

    /// Object store list/get/put failure
    #[error("Object store {operation} failed for {key}: {message}")]
    Store {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// Environment file could not be read
    #[error("Unable to parse line {line}: {source}")]
    EnvParse {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// Object key does not live under the expected namespace root
    #[error("Key {key} is not under namespace root {root}")]
    OutsideNamespace { key: String, root: String },

    /// Relative path would resolve outside the local root
    #[error("Refusing to write outside the target directory: {path}")]
    UnsafePath { path: String },

    /// `container` was invoked without a command to run
    #[error("No command given to run in the container")]
    MissingCommand,

    /// Invalid or incomplete configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Failure while pushing a single local file
    #[error("push failed for {path}: {source}")]
    Push {
        path: String,
        #[source]
        source: Box<SyncError>,
    },

    /// Failure while pulling a single object
    #[error("pull failed for {key}: {source}")]
    Pull {
        key: String,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// Create a filesystem error
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Create an object store error
    pub fn store(
        operation: &'static str,
        key: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Store {
            operation,
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a KMS error
    pub fn kms(operation: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Kms {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Tag an error with the local file being pushed
    pub fn push(path: impl Into<String>, source: SyncError) -> Self {
        Self::Push {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Tag an error with the object key being pulled
    pub fn pull(key: impl Into<String>, source: SyncError) -> Self {
        Self::Pull {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Strip operation tags and return the underlying failure
    pub fn root_cause(&self) -> &SyncError {
        match self {
            Self::Push { source, .. } | Self::Pull { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_error_names_key() {
        let err = SyncError::pull(
            "dev/app/latest/secret.txt.enc",
            SyncError::kms("decrypt", "InvalidCiphertextException"),
        );

        let message = err.to_string();
        assert!(message.contains("dev/app/latest/secret.txt.enc"));
        assert!(message.contains("InvalidCiphertextException"));
    }

    #[test]
    fn test_root_cause_unwraps_tags() {
        let err = SyncError::push("a.txt", SyncError::push("b.txt", SyncError::MissingCommand));
        assert!(matches!(err.root_cause(), SyncError::MissingCommand));
    }
}
