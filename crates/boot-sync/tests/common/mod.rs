//! Shared helpers for boot-sync integration tests

#![allow(dead_code)]

pub mod mocks;

use std::path::Path;

pub use mocks::FakeKms;

/// Key id accepted by [`FakeKms`]
pub const KEY_ID: &str = "alias/boot-test";

/// Write `contents` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Relative paths under a revision root, with the encryption marker removed
pub fn relative_paths(keys: &[String], root: &str) -> Vec<String> {
    let prefix = format!("{}/", root);
    let mut paths: Vec<String> = keys
        .iter()
        .filter_map(|k| k.strip_prefix(&prefix))
        .map(|k| k.strip_suffix(".enc").unwrap_or(k).to_string())
        .collect();
    paths.sort();
    paths
}
