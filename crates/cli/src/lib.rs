//! `erp-workflow`: command-line access to the order status workflows.
//!
//! Used by support staff and by the order screens' build to dump transition
//! tables. All decisions come from `erp_core`.

pub mod cli;
pub mod commands;
pub mod config;

use cli::Cli;
use commands::{Rendered, Settings};
use config::CliConfig;

/// Resolve configuration and run the parsed command.
pub fn run(cli: Cli) -> anyhow::Result<Rendered> {
    let config = CliConfig::from_env()?;
    tracing::debug!(?config, "Loaded CLI configuration");

    let settings = Settings {
        format: cli.format.unwrap_or(config.format),
        default_kind: config.default_kind,
    };
    commands::execute(&cli.command, &settings)
}
