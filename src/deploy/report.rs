//! Run summaries printed at the end of a deployment or a dry run.

use super::binder::BindReport;
use super::publish::PublishOutcome;
use super::sync::SyncReport;
use crate::cli::RuntimeConfig;
use crate::manifest::IconRecord;

/// Sitemap references for navigation icons, e.g. `$webresource:p_/icons/nav/home.svg`
pub fn navigation_refs(records: &[IconRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|record| record.is_navigation())
        .map(|record| format!("$webresource:{}", record.web_resource_name))
        .collect()
}

/// Everything a deployment did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub sync: SyncReport,
    pub bindings: BindReport,
    pub navigation_refs: Vec<String>,
    pub publish: PublishOutcome,
}

impl DeploySummary {
    /// Whether any item or the publish step failed
    pub fn has_failures(&self) -> bool {
        self.sync.failed() > 0
            || !self.bindings.failures.is_empty()
            || matches!(self.publish, PublishOutcome::Failed(_))
    }

    pub fn print(&self, runtime_config: &RuntimeConfig) {
        runtime_config.section("Summary");
        runtime_config.indent(&format!("Web resources created: {}", self.sync.created));
        runtime_config.indent(&format!("Web resources updated: {}", self.sync.updated));
        runtime_config.indent(&format!("Web resources failed:  {}", self.sync.failed()));
        runtime_config.indent(&format!(
            "Missing assets:        {}",
            self.sync.missing_assets.len()
        ));
        runtime_config.indent(&format!(
            "Entity icons bound:    {}/{}",
            self.bindings.bound.len(),
            self.bindings.attempted()
        ));

        for failure in self.sync.failures.iter().chain(&self.bindings.failures) {
            runtime_config.warn(&format!("{}: {}", failure.name, failure.reason));
        }

        if !self.navigation_refs.is_empty() {
            runtime_config.section("Navigation icons (add to the sitemap manually)");
            for reference in &self.navigation_refs {
                runtime_config.indent(reference);
            }
        }

        match &self.publish {
            PublishOutcome::Published => {}
            PublishOutcome::Skipped => {
                runtime_config.info("Remember to publish all customizations in the maker portal.")
            }
            PublishOutcome::Failed(_) => runtime_config.warn(
                "Customizations were NOT published. Publish all customizations manually in the maker portal.",
            ),
        }

        if self.has_failures() {
            runtime_config.warn("Deployment finished with failures; re-run to retry.");
        } else {
            runtime_config.success("Deployment complete");
        }
    }
}

/// What a deployment would touch, computed without any remote call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewCounts {
    /// Records whose asset resolves and would be created or updated
    pub web_resources: usize,
    /// Entity records with a logical name
    pub associations: usize,
    pub navigation_refs: Vec<String>,
    /// `localPath` of records whose asset is missing
    pub missing_assets: Vec<String>,
}

impl PreviewCounts {
    pub fn print(&self, runtime_config: &RuntimeConfig) {
        runtime_config.section("Dry run (no changes made)");
        runtime_config.indent(&format!("Web resources to upsert: {}", self.web_resources));
        runtime_config.indent(&format!("Entity icons to bind:    {}", self.associations));
        runtime_config.indent(&format!(
            "Navigation references:   {}",
            self.navigation_refs.len()
        ));
        for reference in &self.navigation_refs {
            runtime_config.verbose_println(&format!("     {}", reference));
        }
        if !self.missing_assets.is_empty() {
            runtime_config.indent(&format!(
                "Missing assets (skipped): {}",
                self.missing_assets.len()
            ));
        }
    }
}
