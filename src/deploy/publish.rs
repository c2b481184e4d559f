//! Final publish of all customizations.

use crate::cli::RuntimeConfig;
use crate::dataverse::DataverseApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// Disabled with `--no-publish`
    Skipped,
    Failed(String),
}

/// Publishes pending customizations. Failure is reported, never propagated;
/// whatever was uploaded before stays in place.
pub async fn publish<A: DataverseApi>(
    api: &A,
    enabled: bool,
    runtime_config: &RuntimeConfig,
) -> PublishOutcome {
    if !enabled {
        runtime_config.info("Publish skipped (--no-publish)");
        return PublishOutcome::Skipped;
    }

    runtime_config.progress("Publishing all customizations...");
    match api.publish_all().await {
        Ok(()) => {
            runtime_config.success("Published");
            PublishOutcome::Published
        }
        Err(e) => {
            log::warn!("PublishAllXml failed: {}", e);
            runtime_config.warn(&format!("Publish failed: {}", e));
            PublishOutcome::Failed(e.to_string())
        }
    }
}
