//! `boot container -- <cmd> [args...]`: pull, then hand over to a workload

use anyhow::{Context, Result};
use boot_sync::{EnvVars, SyncConfig, SyncError};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, info};

use super::pull::pull_into;
use crate::cli::ContainerArgs;
use crate::output;

/// Exit code reported when the workload was killed by a signal
const SIGNALED_EXIT_CODE: i32 = 128;

/// Returns the child's exit code
pub async fn run(args: ContainerArgs, config: SyncConfig) -> Result<i32> {
    let command = workload(&args.command)?;

    output::header("Boot Container");
    let mut env = EnvVars::new();
    let report = pull_into(&config, &mut env).await?;

    if report.dry_run {
        output::dry_run(&format!("not starting {}", args.command.join(" ")));
        return Ok(0);
    }

    run_workload(command, &env).await
}

/// Build the workload command; stdio and working directory are inherited
fn workload(argv: &[String]) -> std::result::Result<Command, SyncError> {
    let (program, program_args) = argv.split_first().ok_or(SyncError::MissingCommand)?;

    let mut command = Command::new(program);
    command.args(program_args);
    Ok(command)
}

/// Start the workload with `env` added to its environment and wait for it
async fn run_workload(mut command: Command, env: &EnvVars) -> Result<i32> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    info!("exec {}", program);
    debug!("Injecting {} environment variables", env.len());

    let status = command
        .envs(env)
        .status()
        .await
        .with_context(|| format!("Failed to start {}", program))?;

    Ok(exit_code(status))
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SIGNALED_EXIT_CODE)
}
