//! Uploads every icon with a local asset as an SVG web resource.

use super::DeployConfig;
use super::upsert::{UpsertOutcome, upsert_web_resource};
use crate::cli::RuntimeConfig;
use crate::dataverse::{DataverseApi, WebResource};
use crate::manifest::IconRecord;
use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

/// One item that could not be deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Web resource or entity name
    pub name: String,
    pub reason: String,
}

/// Running counters of the web resource batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub failures: Vec<ItemFailure>,
    /// `localPath` of records skipped because the file does not exist
    pub missing_assets: Vec<String>,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn record(&mut self, record: &IconRecord, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Failed(reason) => self.failures.push(ItemFailure {
                name: record.web_resource_name.clone(),
                reason,
            }),
        }
    }
}

/// Resolves `localPath` under `assets_root`, returning it only if it is a file.
///
/// Both `/` and `\` are accepted as separators so manifests authored on
/// Windows resolve everywhere. Paths that climb out of the root with `..`
/// or carry a drive prefix never resolve.
pub fn resolve_asset(assets_root: &Path, record: &IconRecord) -> Option<PathBuf> {
    let mut path = assets_root.to_path_buf();
    for segment in record
        .local_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
    {
        if segment == ".." || segment.contains(':') {
            return None;
        }
        path.push(segment);
    }
    path.is_file().then_some(path)
}

/// Desired remote state for `record` given the raw SVG bytes
pub fn build_web_resource(
    record: &IconRecord,
    svg: &[u8],
    introduced_version: &str,
) -> WebResource {
    WebResource::svg(
        record.web_resource_name.as_str(),
        record.name.as_str(),
        record.description.as_str(),
        STANDARD.encode(svg),
        introduced_version,
    )
}

async fn read_svg(path: &Path) -> anyhow::Result<Vec<u8>> {
    let svg = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    if svg.is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    Ok(svg)
}

/// Upserts each record in order; never stops early.
pub async fn synchronize<A: DataverseApi>(
    api: &A,
    records: &[IconRecord],
    config: &DeployConfig,
    runtime_config: &RuntimeConfig,
) -> SyncReport {
    let mut report = SyncReport::default();
    let total = records.len();

    for (index, record) in records.iter().enumerate() {
        let position = format!("[{}/{}]", index + 1, total);

        let Some(path) = resolve_asset(&config.assets_root, record) else {
            log::warn!(
                "Asset for '{}' not found under {}: {}",
                record.id,
                config.assets_root.display(),
                record.local_path
            );
            runtime_config.warn(&format!(
                "{} Skipping {}: file not found ({})",
                position, record.web_resource_name, record.local_path
            ));
            report.missing_assets.push(record.local_path.clone());
            continue;
        };

        runtime_config.verbose_println(&format!("{} Reading {}", position, path.display()));

        let outcome = match read_svg(&path).await {
            Ok(svg) => {
                let resource = build_web_resource(record, &svg, &config.introduced_version);
                upsert_web_resource(api, &record.web_resource_name, &resource).await
            }
            Err(e) => UpsertOutcome::Failed(format!("{:#}", e)),
        };

        match &outcome {
            UpsertOutcome::Created => runtime_config.success(&format!(
                "{} Created {}",
                position, record.web_resource_name
            )),
            UpsertOutcome::Updated => runtime_config.success(&format!(
                "{} Updated {}",
                position, record.web_resource_name
            )),
            UpsertOutcome::Failed(reason) => runtime_config.warn(&format!(
                "{} Failed {}: {}",
                position, record.web_resource_name, reason
            )),
        }

        report.record(record, outcome);
    }

    report
}
