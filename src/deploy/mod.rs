//! Icon deployment workflow.
//!
//! A run is strictly sequential:
//! 1. Upsert every icon with a local SVG as a web resource ([`sync`])
//! 2. Bind entity icons to their tables ([`binder`])
//! 3. List navigation references for the sitemap
//! 4. Publish all customizations ([`publish`])
//!
//! Per-item failures are collected into the returned [`DeploySummary`]; none
//! of these steps aborts the run.

pub mod binder;
pub mod publish;
pub mod report;
pub mod sync;
pub mod upsert;

#[cfg(test)]
pub(crate) mod mock;

pub use binder::{BindReport, bind_entities};
pub use publish::{PublishOutcome, publish};
pub use report::{DeploySummary, PreviewCounts, navigation_refs};
pub use sync::{ItemFailure, SyncReport, resolve_asset, synchronize};
pub use upsert::{UpsertOutcome, upsert_web_resource};

use crate::cli::RuntimeConfig;
use crate::dataverse::DataverseApi;
use crate::manifest::Manifest;
use std::path::{Path, PathBuf};

/// Settings for one deployment run
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Root that manifest `localPath`s are relative to
    pub assets_root: PathBuf,
    pub manifest_path: PathBuf,
    /// Written to each web resource's `introducedversion`
    pub introduced_version: String,
    /// Report what would happen without signing in or calling the API
    pub dry_run: bool,
    /// Issue the final publish call
    pub publish: bool,
}

impl DeployConfig {
    /// Config for icons under `assets_root` with the manifest in the same folder
    pub fn new(assets_root: impl AsRef<Path>) -> Self {
        let assets_root = assets_root.as_ref().to_path_buf();
        Self {
            manifest_path: assets_root.join(crate::cli::DEFAULT_MANIFEST_FILE),
            assets_root,
            introduced_version: "1.0".to_string(),
            dry_run: false,
            publish: true,
        }
    }
}

/// Runs upload, entity binding and publish against `api`.
pub async fn run_deployment<A: DataverseApi>(
    api: &A,
    manifest: &Manifest,
    config: &DeployConfig,
    runtime_config: &RuntimeConfig,
) -> DeploySummary {
    runtime_config.section(&format!("Web resources ({})", manifest.icons.len()));
    let sync = synchronize(api, &manifest.icons, config, runtime_config).await;

    runtime_config.section("Entity icons");
    let bindings = bind_entities(api, &manifest.icons, runtime_config).await;
    if bindings.attempted() == 0 {
        runtime_config.info("No entity icons in manifest");
    }

    let navigation_refs = navigation_refs(&manifest.icons);

    runtime_config.section("Publish");
    let publish = publish(api, config.publish, runtime_config).await;

    DeploySummary {
        sync,
        bindings,
        navigation_refs,
        publish,
    }
}

/// Counts what [`run_deployment`] would act on. Touches only the local filesystem.
pub fn preview(
    manifest: &Manifest,
    config: &DeployConfig,
    runtime_config: &RuntimeConfig,
) -> PreviewCounts {
    let mut counts = PreviewCounts::default();

    for record in &manifest.icons {
        match resolve_asset(&config.assets_root, record) {
            Some(_) => counts.web_resources += 1,
            None => {
                runtime_config.warn(&format!(
                    "Missing asset for {}: {}",
                    record.web_resource_name, record.local_path
                ));
                counts.missing_assets.push(record.local_path.clone());
            }
        }
    }

    counts.associations = binder::entity_bindings(&manifest.icons).len();
    counts.navigation_refs = navigation_refs(&manifest.icons);
    counts
}
