use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use erp_cli::cli::Cli;

/// Exit code for a `check` whose transition was rejected.
const EXIT_REJECTED: u8 = 2;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "erp_cli=warn,erp_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match erp_cli::run(cli) {
        Ok(rendered) => {
            println!("{}", rendered.output);
            if rendered.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_REJECTED)
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
