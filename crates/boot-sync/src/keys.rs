//! Object key naming
//!
//! Every object lives at `<environment>/<prefix>/<revision>/<relative-path>`.
//! The first three segments form the namespace root of one revision; the
//! relative path below it mirrors the local tree. Encrypted bodies carry the
//! [`ENCRYPTION_MARKER`] suffix on top of that.

use crate::error::{Result, SyncError};
use std::path::{Component, Path};

/// Canonical separator for object keys, independent of the host OS
pub const SEPARATOR: char = '/';

/// Suffix appended to a key exactly when its body is an encrypted envelope
pub const ENCRYPTION_MARKER: &str = ".enc";

/// The (environment, prefix, revision) triple identifying one namespace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub environment: String,
    pub prefix: String,
    pub revision: String,
}

impl Namespace {
    pub fn new(
        environment: impl Into<String>,
        prefix: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            prefix: prefix.into(),
            revision: revision.into(),
        }
    }

    /// Same environment and prefix under a different revision
    pub fn with_revision(&self, revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            ..self.clone()
        }
    }

    /// The key prefix shared by every object of this revision
    pub fn root(&self) -> String {
        make_key(self, "")
    }

    /// Root plus trailing separator; used for listing so that `latest` does
    /// not also match `latest-old`
    pub fn list_prefix(&self) -> String {
        let root = self.root();
        if root.is_empty() {
            root
        } else {
            format!("{}{}", root, SEPARATOR)
        }
    }
}

/// Build the object key for a relative path under a namespace
///
/// Empty segments are dropped so an empty prefix or empty path never yields
/// a doubled separator.
pub fn make_key(namespace: &Namespace, relative_path: &str) -> String {
    [
        namespace.environment.as_str(),
        namespace.prefix.as_str(),
        namespace.revision.as_str(),
        relative_path,
    ]
    .iter()
    .flat_map(|segment| segment.split(SEPARATOR))
    .filter(|part| !part.is_empty() && *part != ".")
    .collect::<Vec<_>>()
    .join("/")
}

/// Recover the relative path of `key` by removing the namespace root
pub fn strip_root(key: &str, namespace: &Namespace) -> Result<String> {
    let root = namespace.root();
    key.strip_prefix(&root)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .ok_or(SyncError::OutsideNamespace {
            key: key.to_string(),
            root,
        })
}

/// Render a relative filesystem path with `/` separators
pub fn relative_key(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether the key names an encrypted envelope
pub fn is_encrypted_key(key: &str) -> bool {
    key.ends_with(ENCRYPTION_MARKER)
}

/// Append the encryption marker
pub fn with_marker(key: &str) -> String {
    format!("{}{}", key, ENCRYPTION_MARKER)
}

/// Remove a trailing encryption marker, if present
pub fn strip_marker(key: &str) -> &str {
    key.strip_suffix(ENCRYPTION_MARKER).unwrap_or(key)
}

/// Keys ending in the separator are directory placeholders, not files
pub fn is_placeholder(key: &str) -> bool {
    key.ends_with(SEPARATOR)
}
