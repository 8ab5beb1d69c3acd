//! Push a local tree to the object store
//!
//! Every regular file is written once per revision strategy. Files at or
//! below the policy threshold are encrypted and stored under `key.enc`;
//! larger files are streamed as-is. The first failure aborts the push.

use crate::config::SyncConfig;
use crate::envelope::{EncryptionPolicy, EnvelopeCodec};
use crate::error::{Result, SyncError};
use crate::keys::{self, Namespace};
use crate::kms::KeyManagement;
use crate::revision::{self, RevisionStrategy};
use crate::store::ObjectStore;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One object written (or, in dry-run, that would have been written)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub relative_path: String,
    pub key: String,
    pub encrypted: bool,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PushReport {
    /// Revision names written, in strategy order
    pub revisions: Vec<String>,
    pub uploads: Vec<UploadRecord>,
    pub dry_run: bool,
}

impl PushReport {
    pub fn files(&self) -> usize {
        self.uploads.len() / self.revisions.len().max(1)
    }

    pub fn encrypted(&self) -> usize {
        self.uploads.iter().filter(|u| u.encrypted).count()
    }
}

/// A local file ready to be put under any revision
enum PreparedBody {
    /// Envelope text, stored under the marked key
    Envelope(String),
    /// Streamed from disk, stored under the plain key
    Raw(PathBuf),
}

pub struct Uploader<'a> {
    store: &'a dyn ObjectStore,
    codec: EnvelopeCodec<&'a dyn KeyManagement>,
    namespace: Namespace,
    key_id: String,
    policy: EncryptionPolicy,
    strategies: Vec<RevisionStrategy>,
    dry_run: bool,
}

impl<'a> Uploader<'a> {
    /// Uploader writing the namespace's revision plus a default snapshot
    pub fn new(
        store: &'a dyn ObjectStore,
        kms: &'a dyn KeyManagement,
        namespace: Namespace,
        key_id: impl Into<String>,
    ) -> Self {
        let strategies = revision::default_strategies(&namespace.revision);
        Self {
            store,
            codec: EnvelopeCodec::new(kms),
            namespace,
            key_id: key_id.into(),
            policy: EncryptionPolicy::default(),
            strategies,
            dry_run: false,
        }
    }

    pub fn from_config(
        store: &'a dyn ObjectStore,
        kms: &'a dyn KeyManagement,
        config: &SyncConfig,
    ) -> Result<Self> {
        Ok(Self::new(store, kms, config.namespace(), config.kms_key_id()?)
            .with_policy(config.policy())
            .with_strategies(config.revision_strategies())
            .with_dry_run(config.dry_run))
    }

    pub fn with_policy(mut self, policy: EncryptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<RevisionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Push `root` using the current time for snapshot revisions
    pub async fn push(&self, root: &Path) -> Result<PushReport> {
        self.push_at(root, Utc::now()).await
    }

    /// Push `root`, resolving every revision strategy against `now`
    pub async fn push_at(&self, root: &Path, now: DateTime<Utc>) -> Result<PushReport> {
        let metadata = tokio::fs::metadata(root)
            .await
            .map_err(|e| SyncError::io("stat", root, e))?;
        if !metadata.is_dir() {
            return Err(SyncError::config(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let revisions = revision::resolve_all(&self.strategies, now)?;
        if revisions.is_empty() {
            return Err(SyncError::config("no revisions to push to"));
        }
        debug!("Pushing {} to revisions {:?}", root.display(), revisions);

        let mut report = PushReport {
            revisions,
            dry_run: self.dry_run,
            ..Default::default()
        };

        for (path, size) in collect_files(root)? {
            let rel = path
                .strip_prefix(root)
                .map(keys::relative_key)
                .unwrap_or_default();

            self.push_file(&path, &rel, size, &mut report)
                .await
                .map_err(|e| SyncError::push(&rel, e))?;
        }

        Ok(report)
    }

    async fn push_file(
        &self,
        path: &Path,
        rel: &str,
        size: u64,
        report: &mut PushReport,
    ) -> Result<()> {
        let body = if self.policy.should_encrypt(size) {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| SyncError::io("read", path, e))?;
            PreparedBody::Envelope(self.codec.encrypt(&data, &self.key_id).await?)
        } else {
            PreparedBody::Raw(path.to_path_buf())
        };

        for revision in &report.revisions {
            let key = keys::make_key(&self.namespace.with_revision(revision.as_str()), rel);

            let record = match &body {
                PreparedBody::Envelope(text) => UploadRecord {
                    relative_path: rel.to_string(),
                    key: keys::with_marker(&key),
                    encrypted: true,
                    bytes: text.len() as u64,
                },
                PreparedBody::Raw(_) => UploadRecord {
                    relative_path: rel.to_string(),
                    key,
                    encrypted: false,
                    bytes: size,
                },
            };

            if self.dry_run {
                info!("(dry run) cp {} {}", rel, self.store.location(&record.key));
            } else {
                info!("cp {} {}", rel, self.store.location(&record.key));
                match &body {
                    PreparedBody::Envelope(text) => {
                        self.store
                            .put_object(&record.key, text.clone().into_bytes())
                            .await?
                    }
                    PreparedBody::Raw(source) => self.store.put_file(&record.key, source).await?,
                }
            }

            report.uploads.push(record);
        }

        Ok(())
    }
}

/// Regular files under `root` with their sizes, in file-name order
fn collect_files(root: &Path) -> Result<Vec<(PathBuf, u64)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| SyncError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_symlink() {
            warn!("Skipping symlink {}", entry.path().display());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|source| SyncError::Walk {
                root: root.to_path_buf(),
                source,
            })?
            .len();
        files.push((entry.into_path(), size));
    }

    Ok(files)
}
