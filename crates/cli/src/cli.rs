use clap::{Args, Parser, Subcommand, ValueEnum};
use erp_core::{CoreError, OrderKind};

use crate::config::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "erp-workflow")]
#[command(about = "Inspect the sales order and production order status workflows")]
#[command(version)]
pub struct Cli {
    /// Output format, overrides ERP_WORKFLOW_FORMAT
    #[arg(long, short = 'f', global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which state machine a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Workflow {
    /// Sales orders and quotes
    Sales,
    /// Manufacturing orders
    Production,
}

/// Order kind selector, only meaningful for the sales workflow.
#[derive(Debug, Clone, Args)]
pub struct KindArg {
    /// quote or confirmed_order, overrides ERP_WORKFLOW_DEFAULT_KIND
    #[arg(long, short = 'k', value_parser = parse_kind)]
    pub kind: Option<OrderKind>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether a status change is allowed
    Check {
        workflow: Workflow,
        /// Current status tag
        current: String,
        /// Requested status tag
        requested: String,
        #[command(flatten)]
        kind: KindArg,
    },
    /// List the statuses reachable from a status
    Transitions {
        workflow: Workflow,
        status: String,
        #[command(flatten)]
        kind: KindArg,
    },
    /// Suggest the natural forward step from a status
    Next {
        workflow: Workflow,
        status: String,
        #[command(flatten)]
        kind: KindArg,
    },
    /// Show whether an entity in a status is final, editable and deletable
    Permissions {
        workflow: Workflow,
        status: String,
        #[command(flatten)]
        kind: KindArg,
    },
    /// Print the full transition table
    Table {
        workflow: Workflow,
        #[command(flatten)]
        kind: KindArg,
    },
}

fn parse_kind(raw: &str) -> Result<OrderKind, CoreError> {
    raw.parse()
}
