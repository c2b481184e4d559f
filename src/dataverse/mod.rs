//! Dataverse Web API access.
//!
//! [`DataverseApi`] is the seam between the deploy workflow and the remote
//! environment. [`DataverseClient`] implements it over HTTPS; tests implement
//! it with an in-memory store.

mod client;
mod types;

pub use client::{API_PATH, DataverseClient};
pub use types::{EntityIcons, SVG_WEB_RESOURCE_TYPE, WebResource};

use crate::error::Result;
use std::future::Future;
use uuid::Uuid;

/// Remote operations the deploy workflow needs.
///
/// Every call is a single request/response; callers await them one at a time.
pub trait DataverseApi {
    /// Looks up a web resource by exact name and returns its id if present.
    fn find_web_resource(&self, name: &str) -> impl Future<Output = Result<Option<Uuid>>> + Send;

    /// Creates a new web resource.
    fn create_web_resource(&self, resource: &WebResource)
    -> impl Future<Output = Result<()>> + Send;

    /// Overwrites the web resource with the given id.
    fn update_web_resource(
        &self,
        id: Uuid,
        resource: &WebResource,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Points all four icon slots of an entity at a web resource.
    ///
    /// Implementations must preserve localized labels on the entity.
    fn update_entity_icons(&self, icons: &EntityIcons) -> impl Future<Output = Result<()>> + Send;

    /// Publishes all pending customizations.
    fn publish_all(&self) -> impl Future<Output = Result<()>> + Send;
}
