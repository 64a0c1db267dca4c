// digichecks/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use digichecks_core::DigichecksError;
use digichecks_core::domain::DomainError;
use digichecks_core::infrastructure::error::InfrastructureError;

use cli::{Cli, Commands, VaultCommand};
use commands::context::AppContext;

/// Exit code for errors. A failing verdict exits with 1.
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    // 1. Setup Logging (Tracing) on stderr; stdout carries results.
    // RUST_LOG=debug digichecks run ... to see the details
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = dispatch(cli).await {
        eprintln!("{}", render(err));
        std::process::exit(EXIT_ERROR);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    // Key generation needs neither config nor registry.
    if let Commands::Vault(VaultCommand::Keygen) = cli.command {
        commands::vault::keygen();
        return Ok(());
    }

    let app = AppContext::load(cli.config.as_deref(), &cli.root)?;
    let cancel = cancel_on_ctrl_c();

    match cli.command {
        // --- USE CASE: RUN CHECK ON A DOCUMENT ---
        Commands::Run {
            company,
            check,
            document,
            format,
        } => commands::run::execute(&app, &company, &check, document, format, cancel).await,

        // --- USE CASE: RUN CHECK ON A DATA-SPACE DATASET ---
        Commands::Dataspace {
            company,
            check,
            dataset_id,
            dataset_type,
            conversion,
            format,
        } => {
            commands::dataspace::execute(
                &app,
                &company,
                &check,
                dataset_id,
                &dataset_type,
                &conversion,
                format,
                cancel,
            )
            .await
        }

        // --- USE CASE: CONVERSION ONLY ---
        Commands::Convert {
            input,
            dataset_type,
            conversion,
            output,
        } => {
            commands::convert::execute(&app, &input, &dataset_type, &conversion, output, cancel)
                .await
        }

        // --- REGISTRY ---
        Commands::Companies(command) => commands::companies::execute(&app, command),
        Commands::Checks(command) => commands::checks::execute(&app, command),
        Commands::Connectors(command) => commands::connectors::execute(&app, command),

        Commands::Vault(VaultCommand::Encrypt { value }) => commands::vault::encrypt(&app, value),
        Commands::Vault(VaultCommand::Keygen) => {
            commands::vault::keygen();
            Ok(())
        }
    }
}

/// Ctrl-C cancels the in-flight run instead of killing the process mid-write.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            child.cancel();
        }
    });
    token
}

/// Library errors are rendered as miette diagnostics (code + help); anything
/// else falls back to the anyhow chain.
fn render(err: anyhow::Error) -> String {
    let context = err.to_string();
    let err = match err.downcast::<DigichecksError>() {
        Ok(e) => return diagnostic(context, miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<DomainError>() {
        Ok(e) => return diagnostic(context, miette::Report::new(e)),
        Err(err) => err,
    };
    match err.downcast::<InfrastructureError>() {
        Ok(e) => diagnostic(context, miette::Report::new(e)),
        Err(err) => format!("❌ {:#}", err),
    }
}

fn diagnostic(context: String, report: miette::Report) -> String {
    // Keep the context line when one was attached on top of the library error.
    if context == report.to_string() {
        format!("{:?}", report)
    } else {
        format!("❌ {}\n{:?}", context, report)
    }
}
