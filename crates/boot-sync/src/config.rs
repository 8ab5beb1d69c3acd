//! Sync configuration
//!
//! One [`SyncConfig`] drives both push and pull. Values come from CLI flags
//! (or their bound environment variables), then an optional YAML file, then
//! the defaults below.

use crate::envelope::{EncryptionPolicy, DEFAULT_MAX_ENCRYPTED_SIZE};
use crate::error::{Result, SyncError};
use crate::keys::Namespace;
use crate::revision::{RevisionStrategy, DEFAULT_SNAPSHOT_FORMAT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SyncConfig {
    /// AWS region
    pub region: String,
    /// Environment segment of every key (e.g. dev, staging, prod)
    pub environment: String,
    /// Relative path of the file loaded into the environment on pull
    pub env_file: String,
    /// Revision pulled, and the stable pointer written on push
    pub revision: String,
    /// KMS key id or alias used to encrypt small files
    pub kms_key_id: Option<String>,
    /// S3 bucket name
    pub bucket: Option<String>,
    /// Key prefix between environment and revision
    pub prefix: String,
    /// Custom S3-compatible endpoint (optional)
    pub endpoint: Option<String>,
    /// Local directory to read from / write to
    pub dir: PathBuf,
    /// Files larger than this are stored unencrypted
    pub max_encrypted_size: u64,
    /// Revisions written on push; empty means stable pointer plus snapshot
    pub revisions: Vec<RevisionStrategy>,
    /// Chrono format of the default snapshot revision
    pub snapshot_format: String,
    /// Log what would change without writing anything
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            environment: "dev".to_string(),
            env_file: "boot.env".to_string(),
            revision: "latest".to_string(),
            kms_key_id: None,
            bucket: None,
            prefix: String::new(),
            endpoint: None,
            dir: PathBuf::from("."),
            max_encrypted_size: DEFAULT_MAX_ENCRYPTED_SIZE,
            revisions: Vec::new(),
            snapshot_format: DEFAULT_SNAPSHOT_FORMAT.to_string(),
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Load a YAML config file; unspecified fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SyncError::io("read", path, e))?;
        serde_yaml_ng::from_str(&content).map_err(|e| {
            SyncError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Namespace of the configured revision
    pub fn namespace(&self) -> Namespace {
        Namespace::new(&self.environment, &self.prefix, &self.revision)
    }

    pub fn policy(&self) -> EncryptionPolicy {
        EncryptionPolicy::new(self.max_encrypted_size)
    }

    /// Strategies used on push
    pub fn revision_strategies(&self) -> Vec<RevisionStrategy> {
        if !self.revisions.is_empty() {
            return self.revisions.clone();
        }
        vec![
            RevisionStrategy::fixed(&self.revision),
            RevisionStrategy::Timestamp {
                format: self.snapshot_format.clone(),
            },
        ]
    }

    pub fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| SyncError::config("an S3 bucket is required (--s3-bucket / BOOT_S3_BUCKET)"))
    }

    pub fn kms_key_id(&self) -> Result<&str> {
        self.kms_key_id
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SyncError::config("a KMS key id is required to push (--kms / BOOT_KMS_ID)"))
    }

    pub fn validate_for_pull(&self) -> Result<()> {
        self.bucket()?;
        if self.environment.is_empty() || self.revision.is_empty() {
            return Err(SyncError::config("environment and revision must not be empty"));
        }
        Ok(())
    }

    pub fn validate_for_push(&self) -> Result<()> {
        self.validate_for_pull()?;
        self.kms_key_id()?;
        for strategy in self.revision_strategies() {
            strategy.validate()?;
        }
        Ok(())
    }
}
