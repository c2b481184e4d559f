//! Command line interface for the icon deployer.
//!
//! Wires argument parsing, manifest loading, sign-in and the deploy workflow
//! together. Only setup failures are returned as errors; everything that
//! happens per icon ends up in the printed summary.

mod args;
mod output;

pub use args::{Args, DEFAULT_MANIFEST_FILE, RuntimeConfig};
pub use output::OutputManager;

use crate::auth;
use crate::dataverse::DataverseClient;
use crate::deploy::{self, DeployConfig};
use crate::error::{CliError, Result};
use crate::manifest::load_manifest;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    execute(Args::parse_args()).await
}

/// Runs the deployment described by already parsed arguments.
///
/// Returns the process exit code.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime_config = RuntimeConfig::from(&args);
    let config = DeployConfig::try_from(&args)?;

    runtime_config.section("Manifest");
    runtime_config.indent(&format!("Manifest: {}", config.manifest_path.display()));
    runtime_config.indent(&format!("Icons:    {}", config.assets_root.display()));
    let manifest = load_manifest(&config.manifest_path)?;
    runtime_config.success(&format!("Loaded {} icon(s)", manifest.icons.len()));

    if config.dry_run {
        let preview = deploy::preview(&manifest, &config, &runtime_config);
        preview.print(&runtime_config);
        return Ok(0);
    }

    let environment_url = args
        .environment_url()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let token = auth::acquire_token(&args.token_source(), &environment_url, &runtime_config).await?;
    let client = DataverseClient::new(&environment_url, &token, args.collection.trim())?
        .with_solution(args.solution.clone());
    log::info!("Deploying to {}", client.api_root());

    let summary = deploy::run_deployment(&client, &manifest, &config, &runtime_config).await;
    summary.print(&runtime_config);

    Ok(0)
}
