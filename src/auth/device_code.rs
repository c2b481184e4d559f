//! OAuth2 device authorization grant against the Microsoft identity platform.
//!
//! 1. Request a device code for the environment scope
//! 2. Show the user code and verification URL
//! 3. Poll the token endpoint until the user signs in or the code expires

use crate::error::AuthError;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{Instant, sleep};

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Added to the polling interval whenever the server answers `slow_down`
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Upper bound on how long a device code is waited for
const MAX_CODE_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Response of the device authorization endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Seconds until `device_code` expires
    pub expires_in: u64,
    /// Minimum seconds between token polls
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Ready-made instruction text for the user
    #[serde(default)]
    pub message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

impl DeviceCodeResponse {
    /// Instruction shown to the user
    pub fn instructions(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, open {} and enter the code {}",
                self.verification_uri, self.user_code
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// What to do after a failed token poll
#[derive(Debug)]
pub(crate) enum PollStatus {
    /// User has not finished signing in
    Pending,
    /// Keep polling, but less often
    SlowDown,
    /// Stop with this error
    Failed(AuthError),
}

pub(crate) fn classify_poll_error(response: OAuthErrorResponse) -> PollStatus {
    match response.error.as_str() {
        "authorization_pending" => PollStatus::Pending,
        "slow_down" => PollStatus::SlowDown,
        "expired_token" => PollStatus::Failed(AuthError::Expired),
        code => PollStatus::Failed(AuthError::Rejected {
            code: code.to_string(),
            description: response
                .error_description
                .clone()
                .unwrap_or_else(|| "no description provided".to_string()),
        }),
    }
}

/// Device-code flow for one tenant and public client application
#[derive(Debug, Clone)]
pub struct DeviceCodeFlow {
    http: reqwest::Client,
    authority: String,
    tenant: String,
    client_id: String,
}

impl DeviceCodeFlow {
    pub fn new(
        authority: impl Into<String>,
        tenant: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: authority.into(),
            tenant: tenant.into(),
            client_id: client_id.into(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/{}",
            self.authority.trim_end_matches('/'),
            self.tenant,
            name
        )
    }

    /// Requests a device code for `scope`
    pub async fn request_code(&self, scope: &str) -> Result<DeviceCodeResponse, AuthError> {
        let response = self
            .http
            .post(self.endpoint("devicecode"))
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope)])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(&body));
        }

        response
            .json::<DeviceCodeResponse>()
            .await
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))
    }

    /// Polls the token endpoint until the user completes sign-in.
    ///
    /// Gives up with [`AuthError::Expired`] once `expires_in` has elapsed.
    pub async fn poll_token(&self, code: &DeviceCodeResponse) -> Result<String, AuthError> {
        let deadline = code_deadline(Instant::now(), code.expires_in);
        let mut interval = Duration::from_secs(code.interval.max(1));

        loop {
            sleep(interval).await;
            if Instant::now() >= deadline {
                return Err(AuthError::Expired);
            }

            let response = self
                .http
                .post(self.endpoint("token"))
                .form(&[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.client_id.as_str()),
                    ("device_code", code.device_code.as_str()),
                ])
                .send()
                .await?;

            if response.status().is_success() {
                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
                return Ok(token.access_token);
            }

            let body = response.text().await.unwrap_or_default();
            let error: OAuthErrorResponse = serde_json::from_str(&body)
                .map_err(|_| AuthError::UnexpectedResponse(body.clone()))?;

            match classify_poll_error(error) {
                PollStatus::Pending => log::debug!("Waiting for device sign-in..."),
                PollStatus::SlowDown => {
                    interval += SLOW_DOWN_STEP;
                    log::debug!(
                        "Identity platform asked to slow down; polling every {:?}",
                        interval
                    );
                }
                PollStatus::Failed(e) => return Err(e),
            }
        }
    }
}

/// Instant after which polling stops; absurd `expires_in` values are capped.
fn code_deadline(now: Instant, expires_in: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in).min(MAX_CODE_LIFETIME);
    now.checked_add(lifetime).unwrap_or(now)
}

fn rejection(body: &str) -> AuthError {
    match serde_json::from_str::<OAuthErrorResponse>(body) {
        Ok(error) => match classify_poll_error(error) {
            PollStatus::Failed(e) => e,
            _ => AuthError::UnexpectedResponse(body.to_string()),
        },
        Err(_) => AuthError::UnexpectedResponse(body.to_string()),
    }
}
