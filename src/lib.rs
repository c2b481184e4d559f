//! Manifest-driven deployment of SVG icons to Dataverse.
//!
//! This library provides the pieces behind the `dataverse_icon_deploy` binary:
//! - Manifest loading and validation
//! - Bearer token acquisition (device-code sign-in or a supplied token)
//! - Web resource upsert, entity icon binding and publishing
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod auth;
pub mod cli;
pub mod dataverse;
pub mod deploy;
pub mod error;
pub mod manifest;

// Re-export commonly used types
pub use error::{AuthError, CliError, DeployError, Result};
