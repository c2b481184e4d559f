//! Create-or-update of a web resource keyed by its unique name.

use crate::dataverse::{DataverseApi, WebResource};
use crate::error::Result;

/// Result of upserting one web resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Failed(String),
}

/// Makes the remote web resource named `key` match `desired`.
///
/// Looks the name up first and updates the existing record when found, so
/// repeated runs never create duplicates. Errors are folded into
/// [`UpsertOutcome::Failed`]; this never returns early for the caller.
pub async fn upsert_web_resource<A: DataverseApi>(
    api: &A,
    key: &str,
    desired: &WebResource,
) -> UpsertOutcome {
    match try_upsert(api, key, desired).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::debug!("Upsert of '{}' failed: {}", key, e);
            UpsertOutcome::Failed(e.to_string())
        }
    }
}

async fn try_upsert<A: DataverseApi>(
    api: &A,
    key: &str,
    desired: &WebResource,
) -> Result<UpsertOutcome> {
    match api.find_web_resource(key).await? {
        Some(id) => {
            log::debug!("'{}' exists as {}; updating", key, id);
            api.update_web_resource(id, desired).await?;
            Ok(UpsertOutcome::Updated)
        }
        None => {
            log::debug!("'{}' not found; creating", key);
            api.create_web_resource(desired).await?;
            Ok(UpsertOutcome::Created)
        }
    }
}
