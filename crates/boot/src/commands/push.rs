//! `boot push`: mirror the local directory into every configured revision

use anyhow::{Context, Result};
use boot_sync::{SyncConfig, Uploader};

use super::{print_settings, Clients};
use crate::output;

pub async fn run(config: SyncConfig) -> Result<()> {
    output::header("Push Secrets");
    config.validate_for_push()?;
    print_settings(&config);

    let clients = Clients::connect(&config).await?;
    let uploader = Uploader::from_config(&clients.store, &clients.kms, &config)?;

    let report = uploader
        .push(&config.dir)
        .await
        .with_context(|| format!("Failed to push {}", config.dir.display()))?;

    output::success(&format!(
        "{} {} files ({} encrypted per revision)",
        if report.dry_run { "Would push" } else { "Pushed" },
        report.files(),
        report.encrypted() / report.revisions.len().max(1),
    ));
    output::kv_list("Revisions", report.revisions.iter().map(String::as_str));

    Ok(())
}
