//! Dataverse icon deployer - uploads the icon library as SVG web resources.
//!
//! Exit code 0 means the run completed; individual icon failures are listed in
//! the summary. Invalid arguments, manifest problems and sign-in failures exit 1.

use dataverse_icon_deploy::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
