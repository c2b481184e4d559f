//! Bearer token acquisition for a Dataverse environment.
//!
//! Either takes a token supplied on the command line / environment, or runs the
//! interactive device-code flow. Any failure here is fatal for the run.

mod device_code;

pub use device_code::{DeviceCodeFlow, DeviceCodeResponse};

use crate::cli::RuntimeConfig;
use crate::error::AuthError;
use url::Url;

/// Microsoft identity platform host
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Tenant segment accepting any work or school account
pub const DEFAULT_TENANT: &str = "organizations";

/// Public client application id registered for Dataverse sample tooling
pub const DEFAULT_CLIENT_ID: &str = "51f81489-12ee-4a9e-aaae-a2591f45987d";

/// Where the bearer token comes from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Token acquired elsewhere (CI pipelines, `az account get-access-token`, ...)
    Provided(String),
    /// Interactive device-code sign-in
    DeviceCode {
        authority: String,
        tenant: String,
        client_id: String,
    },
}

/// OAuth scope granting access to the environment's Web API
pub fn environment_scope(environment_url: &Url) -> String {
    format!("{}/.default", environment_url.origin().ascii_serialization())
}

/// Obtains a bearer token valid for `environment_url`.
pub async fn acquire_token(
    source: &TokenSource,
    environment_url: &Url,
    runtime_config: &RuntimeConfig,
) -> Result<String, AuthError> {
    match source {
        TokenSource::Provided(token) => {
            let token = token.trim();
            if token.is_empty() {
                return Err(AuthError::UnexpectedResponse(
                    "provided access token is empty".to_string(),
                ));
            }
            log::debug!("Using provided access token");
            Ok(token.to_string())
        }
        TokenSource::DeviceCode {
            authority,
            tenant,
            client_id,
        } => {
            let flow = DeviceCodeFlow::new(authority.as_str(), tenant.as_str(), client_id.as_str());
            let scope = environment_scope(environment_url);
            log::info!("Requesting device code for scope {}", scope);

            let code = flow.request_code(&scope).await?;
            runtime_config.section("Sign in");
            runtime_config.indent(&code.instructions());
            runtime_config.progress("Waiting for sign-in to complete...");

            let token = flow.poll_token(&code).await?;
            runtime_config.success("Authenticated");
            Ok(token)
        }
    }
}
