//! Icon manifest loading and validation.
//!
//! The manifest is a JSON document with a top-level `icons` array. It is read
//! once per run and never written back.

use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Visual grouping of an icon in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Navigation (sitemap) icons
    Nav,
    /// Table/entity icons
    Entity,
    /// Command bar icons
    Cmd,
    /// Status indicator icons
    Status,
}

/// How an icon is consumed once deployed.
///
/// Decides which step after upload processes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    Entity,
    Navigation,
    Command,
    Status,
}

/// Curation lifecycle tag. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconStatus {
    Draft,
    Approved,
    Deployed,
    Rejected,
}

/// One SVG asset described by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub usage_type: UsageType,
    /// Set only for `usageType: entity`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_logical_name: Option<String>,
    /// Natural key of the remote web resource
    pub web_resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluent_component: Option<String>,
    /// Path of the SVG relative to the assets root
    pub local_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IconStatus>,
}

impl IconRecord {
    /// Logical name of the entity this icon should be bound to, if any.
    ///
    /// Returns `None` for non-entity records and for entity records whose
    /// logical name is missing or blank.
    pub fn bound_entity(&self) -> Option<&str> {
        if self.usage_type != UsageType::Entity {
            return None;
        }
        self.entity_logical_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether this record is referenced from the sitemap
    pub fn is_navigation(&self) -> bool {
        self.usage_type == UsageType::Navigation
    }
}

/// Parsed manifest document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Icon records in document order
    pub icons: Vec<IconRecord>,
}

/// Load and validate the manifest at `path`.
///
/// Fails with [`DeployError::ManifestNotFound`] when the file is absent,
/// [`DeployError::ManifestParse`] on malformed JSON and
/// [`DeployError::ManifestInvalid`] when web resource names are blank or
/// repeated.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DeployError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let manifest = parse_manifest(&raw).map_err(|source| DeployError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(&manifest).map_err(|reason| DeployError::ManifestInvalid {
        path: path.to_path_buf(),
        reason,
    })?;

    log::info!(
        "Loaded {} icon record(s) from {}",
        manifest.icons.len(),
        path.display()
    );

    Ok(manifest)
}

/// Parse manifest JSON without touching the filesystem
pub fn parse_manifest(raw: &str) -> std::result::Result<Manifest, serde_json::Error> {
    serde_json::from_str(raw)
}

fn validate(manifest: &Manifest) -> std::result::Result<(), String> {
    let mut seen = HashSet::new();

    for record in &manifest.icons {
        if record.web_resource_name.trim().is_empty() {
            return Err(format!("icon '{}' has an empty webResourceName", record.id));
        }
        if !seen.insert(record.web_resource_name.as_str()) {
            return Err(format!(
                "webResourceName '{}' is used by more than one icon",
                record.web_resource_name
            ));
        }
        if record.usage_type == UsageType::Entity && record.bound_entity().is_none() {
            log::warn!(
                "Entity icon '{}' has no entityLogicalName; it will be uploaded but not bound",
                record.id
            );
        }
    }

    Ok(())
}
