//! Error types for manifest loading, authentication and deployment.
//!
//! Only setup failures surface as [`DeployError`] at the top level. Failures of a
//! single web resource or entity call are captured as outcomes by the deploy
//! module so the batch keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deployment operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Main error type for all deployment operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Manifest file does not exist
    #[error("Manifest not found: {}", .path.display())]
    ManifestNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Manifest exists but is not valid JSON for the expected shape
    #[error("Failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        /// Manifest path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Manifest parsed but violates a structural rule
    #[error("Invalid manifest {}: {reason}", .path.display())]
    ManifestInvalid {
        /// Manifest path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Non-success response from the Dataverse Web API
    #[error("Dataverse API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the response envelope, or the raw body
        message: String,
    },

    /// Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL construction errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

/// Device-code flow errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Identity platform rejected a request
    #[error("{code}: {description}")]
    Rejected {
        /// OAuth error code (e.g. `expired_token`)
        code: String,
        /// Human readable description from the identity platform
        description: String,
    },

    /// The device code expired before the user completed sign-in
    #[error("device code expired before sign-in completed")]
    Expired,

    /// Transport failure while talking to the identity platform
    #[error("request to identity platform failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response did not contain what the flow needs
    #[error("unexpected identity platform response: {0}")]
    UnexpectedResponse(String),
}

impl DeployError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::ManifestNotFound { .. } => vec![
                "Pass --manifest with the path to the icon manifest".to_string(),
                "Or pass --icons-path pointing at the folder containing icon-manifest.json"
                    .to_string(),
            ],
            Self::ManifestParse { .. } | Self::ManifestInvalid { .. } => {
                vec!["Fix the manifest and re-run; nothing was deployed".to_string()]
            }
            Self::Auth(_) => vec![
                "Re-run and complete the device sign-in before the code expires".to_string(),
                "Or supply a token with --access-token / DATAVERSE_ACCESS_TOKEN".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
