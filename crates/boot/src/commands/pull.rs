//! `boot pull`: restore a revision into the local directory

use anyhow::{Context, Result};
use boot_sync::{Downloader, EnvSink, EnvVars, ProcessEnv, PullReport, SyncConfig};

use super::{print_settings, Clients};
use crate::output;

pub async fn run(config: SyncConfig) -> Result<()> {
    output::header("Pull Secrets");
    let report = pull_into(&config, &mut ProcessEnv).await?;

    if let Some(vars) = &report.env {
        output::kv_list("Environment", vars.keys().map(String::as_str));
    }

    Ok(())
}

/// Validate, connect and pull, applying environment variables to `sink`
pub(crate) async fn pull_into(config: &SyncConfig, sink: &mut dyn EnvSink) -> Result<PullReport> {
    config.validate_for_pull()?;
    print_settings(config);

    let clients = Clients::connect(config).await?;
    let downloader = Downloader::from_config(&clients.store, &clients.kms, config);

    let report = downloader
        .pull(&config.dir, sink)
        .await
        .with_context(|| format!("Failed to pull {}", config.namespace().root()))?;

    summarize(&report);
    Ok(report)
}

fn summarize(report: &PullReport) {
    let decrypted = report.files.iter().filter(|f| f.decrypted).count();
    let loaded = report.env.as_ref().map(EnvVars::len).unwrap_or(0);

    output::success(&format!(
        "{} {} files ({} decrypted), {} environment variables",
        if report.dry_run { "Would pull" } else { "Pulled" },
        report.files.len(),
        decrypted,
        loaded,
    ));
    if !report.skipped.is_empty() {
        output::info(&format!("Skipped {} directory placeholders", report.skipped.len()));
    }
}
