use anyhow::{anyhow, Context};
use clap::ValueEnum;
use erp_core::OrderKind;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// CLI configuration loaded from environment variables.
///
/// Command-line flags take precedence over every value here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Output format (default: `text`).
    pub format: OutputFormat,
    /// Order kind used by sales commands when `--kind` is omitted
    /// (default: `confirmed_order`).
    pub default_kind: OrderKind,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            default_kind: OrderKind::ConfirmedOrder,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default           |
    /// |-----------------------------|-------------------|
    /// | `ERP_WORKFLOW_FORMAT`       | `text`            |
    /// | `ERP_WORKFLOW_DEFAULT_KIND` | `confirmed_order` |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let format = match lookup("ERP_WORKFLOW_FORMAT") {
            Some(raw) => OutputFormat::from_str(raw.trim(), true)
                .map_err(|_| anyhow!("ERP_WORKFLOW_FORMAT must be 'text' or 'json', got '{raw}'"))?,
            None => defaults.format,
        };

        let default_kind = match lookup("ERP_WORKFLOW_DEFAULT_KIND") {
            Some(raw) => raw
                .parse::<OrderKind>()
                .context("ERP_WORKFLOW_DEFAULT_KIND is invalid")?,
            None => defaults.default_kind,
        };

        Ok(Self {
            format,
            default_kind,
        })
    }
}
