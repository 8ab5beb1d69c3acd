//! CLI argument parsing with clap

use anyhow::{Context, Result};
use boot_sync::SyncConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Boot - encrypted secrets for containers, kept in S3
#[derive(Parser, Debug)]
#[command(name = "boot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub sync: SyncArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push the local directory to S3
    Push,

    /// Pull a revision from S3 into the local directory
    Pull,

    /// Pull, then run a command with the loaded environment
    Container(ContainerArgs),
}

#[derive(Args, Debug)]
pub struct ContainerArgs {
    /// Command (and arguments) to run after the pull
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Options shared by every command; unset values fall back to the config
/// file, then to built-in defaults
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Path to a boot.yaml config file
    #[arg(short, long, env = "BOOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// AWS region [default: us-east-1]
    #[arg(long, env = "AWS_DEFAULT_REGION", global = true)]
    pub region: Option<String>,

    /// Environment segment, e.g. dev, staging, prod [default: dev]
    #[arg(long = "env", env = "BOOT_ENV", global = true)]
    pub environment: Option<String>,

    /// File loaded into the environment instead of written [default: boot.env]
    #[arg(long = "file", env = "BOOT_FILE", global = true)]
    pub env_file: Option<String>,

    /// Revision to pull, and the stable revision written on push [default: latest]
    #[arg(long, env = "BOOT_REVISION", global = true)]
    pub revision: Option<String>,

    /// KMS key id or alias used to encrypt small files
    #[arg(long = "kms", env = "BOOT_KMS_ID", global = true)]
    pub kms_key_id: Option<String>,

    /// S3 bucket holding the secrets
    #[arg(long = "s3-bucket", env = "BOOT_S3_BUCKET", global = true)]
    pub bucket: Option<String>,

    /// Key prefix between environment and revision
    #[arg(long = "s3-prefix", env = "BOOT_PREFIX", global = true)]
    pub prefix: Option<String>,

    /// Custom S3-compatible endpoint (e.g., MinIO)
    #[arg(long, env = "BOOT_S3_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Local directory to push from or pull into [default: .]
    #[arg(long, env = "BOOT_DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Files larger than this many bytes are stored unencrypted [default: 4000]
    #[arg(long, env = "BOOT_MAX_ENCRYPTED_SIZE", global = true)]
    pub max_encrypted_size: Option<u64>,

    /// Chrono format of the snapshot revision written on push [default: %Y%m%d.%H%M]
    #[arg(long, env = "BOOT_SNAPSHOT_FORMAT", global = true)]
    pub snapshot_format: Option<String>,

    /// Show what would be transferred without writing anything
    #[arg(
        long,
        env = "BOOT_DRYRUN",
        global = true,
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub dryrun: bool,
}

impl SyncArgs {
    /// Merge flags over the config file over defaults
    pub fn resolve_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SyncConfig::default(),
        };

        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(environment) = &self.environment {
            config.environment = environment.clone();
        }
        if let Some(env_file) = &self.env_file {
            config.env_file = env_file.clone();
        }
        if let Some(revision) = &self.revision {
            config.revision = revision.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(size) = self.max_encrypted_size {
            config.max_encrypted_size = size;
        }
        if let Some(format) = &self.snapshot_format {
            config.snapshot_format = format.clone();
        }
        if let Some(dir) = &self.dir {
            config.dir = dir.clone();
        }
        if self.kms_key_id.is_some() {
            config.kms_key_id = self.kms_key_id.clone();
        }
        if self.bucket.is_some() {
            config.bucket = self.bucket.clone();
        }
        if self.endpoint.is_some() {
            config.endpoint = self.endpoint.clone();
        }
        config.dry_run |= self.dryrun;

        if config.dir.is_relative() {
            let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
            config.dir = cwd.join(&config.dir);
        }

        Ok(config)
    }
}
