//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap,
//! with environment variable fallbacks for CI usage.

use crate::auth::{DEFAULT_AUTHORITY, DEFAULT_CLIENT_ID, DEFAULT_TENANT, TokenSource};
use crate::deploy::DeployConfig;
use crate::error::DeployError;
use clap::Parser;
use path_absolutize::Absolutize;
use std::path::PathBuf;
use url::Url;

/// Manifest file name looked up inside the icons folder
pub const DEFAULT_MANIFEST_FILE: &str = "icon-manifest.json";

/// Deploy SVG icons from the icon library to a Dataverse environment
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dataverse_icon_deploy",
    version,
    about = "Deploy SVG icons as web resources to a Dataverse environment",
    long_about = "Uploads every icon in the manifest as an SVG web resource (creating or updating by name),
binds entity icons to their tables, then publishes all customizations.

Usage:
  dataverse_icon_deploy --environment-url https://contoso.crm.dynamics.com
  dataverse_icon_deploy -e https://contoso.crm.dynamics.com --icons-path ./icons --dry-run
  DATAVERSE_ACCESS_TOKEN=... dataverse_icon_deploy -e https://contoso.crm.dynamics.com --solution ContosoIcons

Exit code 0 = run completed (individual icon failures are listed in the summary)."
)]
pub struct Args {
    /// Dataverse environment URL, e.g. https://contoso.crm.dynamics.com
    #[arg(short = 'e', long, env = "DATAVERSE_URL", value_name = "URL")]
    pub environment_url: String,

    /// Entity set that stores web resources
    #[arg(long, default_value = "webresourceset", value_name = "NAME")]
    pub collection: String,

    /// Folder containing the SVG files (asset paths in the manifest are relative to it)
    #[arg(short = 'i', long, default_value = "icons", value_name = "PATH")]
    pub icons_path: PathBuf,

    /// Manifest path [default: <icons-path>/icon-manifest.json]
    #[arg(short = 'm', long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Show what would be deployed without signing in or calling the API
    #[arg(long, visible_alias = "what-if")]
    pub dry_run: bool,

    /// Skip the final publish step
    #[arg(long)]
    pub no_publish: bool,

    /// Unique name of an unmanaged solution to add web resources to
    #[arg(long, value_name = "NAME")]
    pub solution: Option<String>,

    /// Value written to each web resource's introducedversion
    #[arg(long, default_value = "1.0", value_name = "VERSION")]
    pub introduced_version: String,

    /// Pre-acquired bearer token; skips the device-code sign-in
    #[arg(long, env = "DATAVERSE_ACCESS_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Azure AD tenant used for device-code sign-in
    #[arg(long, env = "DATAVERSE_TENANT", default_value = DEFAULT_TENANT, value_name = "TENANT")]
    pub tenant: String,

    /// Public client application id used for device-code sign-in
    #[arg(long, env = "DATAVERSE_CLIENT_ID", default_value = DEFAULT_CLIENT_ID, value_name = "ID")]
    pub client_id: String,

    /// Print per-request details
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings, errors and nothing else
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        self.environment_url()?;

        if self.collection.trim().is_empty() {
            return Err("Collection name cannot be empty".to_string());
        }

        if self.introduced_version.trim().is_empty() {
            return Err("Introduced version cannot be empty".to_string());
        }

        Ok(())
    }

    /// Parsed environment URL; must be http(s) with a host
    pub fn environment_url(&self) -> Result<Url, String> {
        let url = Url::parse(self.environment_url.trim())
            .map_err(|e| format!("Invalid environment URL '{}': {}", self.environment_url, e))?;

        if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
            return Err(format!(
                "Environment URL must be an http(s) URL with a host: {}",
                self.environment_url
            ));
        }

        Ok(url)
    }

    /// Token source derived from `--access-token` or the device-code settings
    pub fn token_source(&self) -> TokenSource {
        match self.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => TokenSource::Provided(token.to_string()),
            _ => TokenSource::DeviceCode {
                authority: DEFAULT_AUTHORITY.to_string(),
                tenant: self.tenant.clone(),
                client_id: self.client_id.clone(),
            },
        }
    }
}

impl TryFrom<&Args> for DeployConfig {
    type Error = DeployError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let assets_root = args.icons_path.absolutize()?.into_owned();
        let manifest_path = match &args.manifest {
            Some(path) => path.absolutize()?.into_owned(),
            None => assets_root.join(DEFAULT_MANIFEST_FILE),
        };

        Ok(DeployConfig {
            assets_root,
            manifest_path,
            introduced_version: args.introduced_version.trim().to_string(),
            dry_run: args.dry_run,
            publish: !args.no_publish,
        })
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(super::OutputManager::new(args.verbose, args.quiet))
    }
}

impl RuntimeConfig {
    pub fn new(output: super::OutputManager) -> Self {
        Self { output }
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        self.output.verbose(message)
    }

    /// Print informational message if not in quiet mode
    pub fn info(&self, message: &str) {
        self.output.info(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) {
        self.output.success(message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        self.output.indent(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["dataverse_icon_deploy", "-e", "https://contoso.crm.dynamics.com"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.collection, "webresourceset");
        assert_eq!(args.icons_path, PathBuf::from("icons"));
        assert!(!args.dry_run);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn what_if_alias_enables_dry_run() {
        assert!(parse(&["--what-if"]).dry_run);
    }

    #[test]
    fn manifest_defaults_to_icons_folder() {
        let config = DeployConfig::try_from(&parse(&["--icons-path", "/srv/icons"])).unwrap();
        assert_eq!(config.assets_root, PathBuf::from("/srv/icons"));
        assert_eq!(config.manifest_path, PathBuf::from("/srv/icons/icon-manifest.json"));
        assert!(config.publish);

        let config =
            DeployConfig::try_from(&parse(&["-m", "/tmp/m.json", "--no-publish"])).unwrap();
        assert_eq!(config.manifest_path, PathBuf::from("/tmp/m.json"));
        assert!(!config.publish);
    }

    #[test]
    fn rejects_non_http_environment_url() {
        let mut args = parse(&[]);
        args.environment_url = "ftp://contoso".to_string();
        assert!(args.validate().is_err());
        args.environment_url = "not a url".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn blank_introduced_version_is_rejected_by_validate() {
        let args = parse(&["--introduced-version", " "]);
        assert_eq!(args.validate().unwrap_err(), "Introduced version cannot be empty");
    }

    #[test]
    fn blank_access_token_falls_back_to_device_code() {
        let mut args = parse(&["--tenant", "contoso.onmicrosoft.com"]);
        args.access_token = Some("  ".to_string());
        match args.token_source() {
            TokenSource::DeviceCode { tenant, .. } => assert_eq!(tenant, "contoso.onmicrosoft.com"),
            other => panic!("unexpected source: {other:?}"),
        }

        args.access_token = Some("tok".to_string());
        assert!(matches!(args.token_source(), TokenSource::Provided(t) if t == "tok"));
    }
}
