//! CLI command implementations

pub mod container;
pub mod pull;
pub mod push;

use boot_sync::{AwsKms, S3Store, SyncConfig};

use crate::output;

/// AWS clients for one command run
pub struct Clients {
    pub store: S3Store,
    pub kms: AwsKms,
}

impl Clients {
    /// Load AWS configuration for the configured region and build both clients
    pub async fn connect(config: &SyncConfig) -> anyhow::Result<Self> {
        let bucket = config.bucket()?;
        let sdk_config = boot_sync::load_aws_config(&config.region).await;

        Ok(Self {
            store: S3Store::new(&sdk_config, bucket, config.endpoint.as_deref()),
            kms: AwsKms::new(&sdk_config),
        })
    }
}

/// Print the resolved settings shared by every command
fn print_settings(config: &SyncConfig) {
    output::kv("Bucket", config.bucket.as_deref().unwrap_or_default());
    output::kv("Namespace", &config.namespace().root());
    output::kv("Directory", &config.dir.display().to_string());
    output::kv("Region", &config.region);
    if let Some(endpoint) = &config.endpoint {
        output::kv("Endpoint", endpoint);
    }
    if config.dry_run {
        output::dry_run("nothing will be written");
    }
    println!();
}
