//! Secret distribution for containers via S3 and KMS
//!
//! This crate mirrors a local directory tree to a versioned object-store
//! namespace and back:
//! - **Key naming**: `<environment>/<prefix>/<revision>/<relative-path>[.enc]`
//! - **Envelope encryption**: files up to a size threshold are encrypted with KMS
//!   and stored as base64 text under a `.enc` key; larger files are stored raw
//! - **Revisions**: every push writes a stable pointer plus a timestamped snapshot
//! - **Environment loading**: one designated file is parsed into environment
//!   variables on pull instead of being written to disk

pub mod config;
pub mod download;
pub mod env_file;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod kms;
pub mod revision;
pub mod store;
pub mod upload;

// Re-export commonly used items
pub use config::SyncConfig;
pub use download::{Downloader, PullReport, PulledFile};
pub use env_file::{load_env, parse_env, EnvSink, EnvVars, ProcessEnv};
pub use envelope::{EncryptionPolicy, EnvelopeCodec, DEFAULT_MAX_ENCRYPTED_SIZE};
pub use error::{Result, SyncError};
pub use keys::{make_key, strip_root, Namespace, ENCRYPTION_MARKER};
pub use kms::{AwsKms, KeyManagement};
pub use revision::RevisionStrategy;
pub use store::{MemoryStore, ObjectStore, S3Store};
pub use upload::{PushReport, UploadRecord, Uploader};

/// Load shared AWS configuration for the given region
pub async fn load_aws_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(region.to_string()))
        .load()
        .await
}
