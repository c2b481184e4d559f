//! Request payloads for the Dataverse Web API.

use serde::Serialize;

/// `webresourcetype` option value for SVG (vector) images
pub const SVG_WEB_RESOURCE_TYPE: u8 = 11;

/// Desired state of a web resource, serialized as the create/update body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebResource {
    /// Unique name, e.g. `contoso_/icons/entity/account.svg`
    pub name: String,
    pub displayname: String,
    pub description: String,
    pub webresourcetype: u8,
    /// Base64 encoded file content
    pub content: String,
    pub isenabledformobileclient: bool,
    pub introducedversion: String,
}

impl WebResource {
    /// Builds an SVG web resource from already encoded content
    pub fn svg(
        name: impl Into<String>,
        displayname: impl Into<String>,
        description: impl Into<String>,
        content: String,
        introducedversion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            displayname: displayname.into(),
            description: description.into(),
            webresourcetype: SVG_WEB_RESOURCE_TYPE,
            content,
            isenabledformobileclient: true,
            introducedversion: introducedversion.into(),
        }
    }
}

/// Association of an entity's icon slots with one web resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIcons {
    pub entity_logical_name: String,
    pub web_resource_name: String,
}

impl EntityIcons {
    pub fn new(
        entity_logical_name: impl Into<String>,
        web_resource_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_logical_name: entity_logical_name.into(),
            web_resource_name: web_resource_name.into(),
        }
    }

    /// Entity metadata body with small, medium, large and vector icons set
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "@odata.type": "Microsoft.Dynamics.CRM.EntityMetadata",
            "IconSmallName": self.web_resource_name,
            "IconMediumName": self.web_resource_name,
            "IconLargeName": self.web_resource_name,
            "IconVectorName": self.web_resource_name,
        })
    }
}
