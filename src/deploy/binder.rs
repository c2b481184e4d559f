//! Points entity icon slots at their uploaded web resources.

use super::sync::ItemFailure;
use crate::cli::RuntimeConfig;
use crate::dataverse::{DataverseApi, EntityIcons};
use crate::manifest::IconRecord;

/// Outcome of the entity binding pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Logical names of entities whose icons were updated
    pub bound: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl BindReport {
    pub fn attempted(&self) -> usize {
        self.bound.len() + self.failures.len()
    }
}

/// Entity bindings implied by the manifest, in document order
pub fn entity_bindings(records: &[IconRecord]) -> Vec<EntityIcons> {
    records
        .iter()
        .filter_map(|record| {
            record
                .bound_entity()
                .map(|entity| EntityIcons::new(entity, record.web_resource_name.as_str()))
        })
        .collect()
}

/// Updates each entity's icon metadata; a failure only affects that entity.
pub async fn bind_entities<A: DataverseApi>(
    api: &A,
    records: &[IconRecord],
    runtime_config: &RuntimeConfig,
) -> BindReport {
    let mut report = BindReport::default();

    for icons in entity_bindings(records) {
        let result = api.update_entity_icons(&icons).await;
        match result {
            Ok(()) => {
                runtime_config.success(&format!(
                    "{} -> {}",
                    icons.entity_logical_name, icons.web_resource_name
                ));
                report.bound.push(icons.entity_logical_name);
            }
            Err(e) => {
                log::warn!("Binding icon to '{}' failed: {}", icons.entity_logical_name, e);
                runtime_config.warn(&format!(
                    "Failed to set icon on {}: {}",
                    icons.entity_logical_name, e
                ));
                report.failures.push(ItemFailure {
                    name: icons.entity_logical_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
