//! Pull one revision from the object store into a local tree
//!
//! Objects ending in `.enc` are decrypted before being written; everything
//! else is streamed verbatim. The designated environment file is parsed
//! instead of written, and its variables reach the [`EnvSink`] only after
//! the whole pull succeeded.

use crate::config::SyncConfig;
use crate::env_file::{parse_env, EnvSink, EnvVars};
use crate::envelope::EnvelopeCodec;
use crate::error::{Result, SyncError};
use crate::keys::{self, Namespace};
use crate::kms::KeyManagement;
use crate::store::ObjectStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One object materialised on disk (or, in dry-run, that would have been)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulledFile {
    pub key: String,
    pub path: PathBuf,
    pub decrypted: bool,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PullReport {
    pub files: Vec<PulledFile>,
    /// Directory placeholder keys that were ignored
    pub skipped: Vec<String>,
    /// Variables parsed from the environment file, if it was pulled
    pub env: Option<EnvVars>,
    pub dry_run: bool,
}

pub struct Downloader<'a> {
    store: &'a dyn ObjectStore,
    codec: EnvelopeCodec<&'a dyn KeyManagement>,
    namespace: Namespace,
    env_file: Option<String>,
    dry_run: bool,
}

impl<'a> Downloader<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        kms: &'a dyn KeyManagement,
        namespace: Namespace,
    ) -> Self {
        Self {
            store,
            codec: EnvelopeCodec::new(kms),
            namespace,
            env_file: None,
            dry_run: false,
        }
    }

    pub fn from_config(
        store: &'a dyn ObjectStore,
        kms: &'a dyn KeyManagement,
        config: &SyncConfig,
    ) -> Self {
        Self::new(store, kms, config.namespace())
            .with_env_file(&config.env_file)
            .with_dry_run(config.dry_run)
    }

    /// Relative path loaded into the environment instead of written; empty disables
    pub fn with_env_file(mut self, env_file: &str) -> Self {
        let normalized = normalize_relative(env_file);
        self.env_file = (!normalized.is_empty()).then_some(normalized);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Mirror the namespace into `root`, applying environment-file variables to `sink`
    pub async fn pull(&self, root: &Path, sink: &mut dyn EnvSink) -> Result<PullReport> {
        let prefix = self.namespace.list_prefix();
        let object_keys = self.store.list_keys(&prefix).await?;
        debug!(
            "Pulling {} objects from {}",
            object_keys.len(),
            self.store.location(&prefix)
        );

        let mut report = PullReport {
            dry_run: self.dry_run,
            ..Default::default()
        };

        for key in object_keys {
            if keys::is_placeholder(&key) {
                debug!("Skipping directory placeholder {}", key);
                report.skipped.push(key);
                continue;
            }

            self.pull_object(root, &key, &mut report)
                .await
                .map_err(|e| SyncError::pull(&key, e))?;
        }

        if let Some(vars) = &report.env {
            if self.dry_run {
                info!("(dry run) would load {} environment variables", vars.len());
            } else {
                sink.apply(vars);
            }
        }

        Ok(report)
    }

    async fn pull_object(&self, root: &Path, key: &str, report: &mut PullReport) -> Result<()> {
        if keys::is_encrypted_key(key) {
            self.decrypt_and_save(root, key, report).await
        } else {
            self.save_raw(root, key, report).await
        }
    }

    async fn decrypt_and_save(
        &self,
        root: &Path,
        key: &str,
        report: &mut PullReport,
    ) -> Result<()> {
        let body = self.store.get_object(key).await?;
        let plaintext = self.codec.decrypt(&body).await?;

        let rel = keys::strip_root(keys::strip_marker(key), &self.namespace)?;
        let path = local_path(root, &rel)?;

        if self.env_file.as_deref() == Some(rel.as_str()) {
            info!("loading {} into the environment", self.store.location(key));
            let vars = parse_env(plaintext.as_slice())?;
            report.env.get_or_insert_with(EnvVars::new).extend(vars);
            return Ok(());
        }

        let record = PulledFile {
            key: key.to_string(),
            path,
            decrypted: true,
            bytes: plaintext.len() as u64,
        };

        if self.dry_run {
            info!("(dry run) saving {} to {}", self.store.location(key), record.path.display());
        } else {
            info!("saving {} to {}", self.store.location(key), record.path.display());
            create_parent(&record.path).await?;
            tokio::fs::write(&record.path, plaintext.as_slice())
                .await
                .map_err(|e| SyncError::io("write", &record.path, e))?;
        }

        report.files.push(record);
        Ok(())
    }

    async fn save_raw(&self, root: &Path, key: &str, report: &mut PullReport) -> Result<()> {
        let rel = keys::strip_root(key, &self.namespace)?;
        let path = local_path(root, &rel)?;

        let bytes = if self.dry_run {
            info!("(dry run) saving {} to {}", self.store.location(key), path.display());
            0
        } else {
            info!("saving {} to {}", self.store.location(key), path.display());
            create_parent(&path).await?;
            self.store.download_to(key, &path).await?
        };

        report.files.push(PulledFile {
            key: key.to_string(),
            path,
            decrypted: false,
            bytes,
        });
        Ok(())
    }
}

/// Join a `/`-separated relative path onto `root`, refusing anything that
/// would climb out of it
fn local_path(root: &Path, rel: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for part in rel.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(SyncError::UnsafePath {
                    path: rel.to_string(),
                })
            }
            part => path.push(part),
        }
    }
    Ok(path)
}

fn normalize_relative(rel: &str) -> String {
    rel.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

async fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io("create directory", parent, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path() {
        let root = Path::new("/srv/app");
        assert_eq!(
            local_path(root, "config/db.yaml").unwrap(),
            Path::new("/srv/app/config/db.yaml")
        );
        assert_eq!(local_path(root, "./boot.env").unwrap(), Path::new("/srv/app/boot.env"));
    }

    #[test]
    fn test_local_path_rejects_parent_components() {
        let err = local_path(Path::new("/srv/app"), "../../etc/passwd").unwrap_err();
        assert!(matches!(err, SyncError::UnsafePath { .. }));
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("./boot.env"), "boot.env");
        assert_eq!(normalize_relative("/config//app.env"), "config/app.env");
        assert_eq!(normalize_relative(""), "");
    }
}
