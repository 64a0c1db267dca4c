// digichecks/src/commands/run.rs
//
// USE CASE: Run a check against a JSON-LD document read from disk.

use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use digichecks_core::application::{ConversionProfile, parse_document};
use digichecks_core::domain::check::Verdict;

use super::context::AppContext;
use crate::cli::OutputFormat;

pub async fn execute(
    app: &AppContext,
    company: &str,
    check: &str,
    document: PathBuf,
    format: OutputFormat,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let check = app.find_check(company, check)?;

    let bytes =
        fs::read(&document).with_context(|| format!("Failed to read document {:?}", document))?;
    let document = parse_document(&bytes)?;

    // The profile only drives tabular conversion, unused here.
    let runner = app.runner(&ConversionProfile::realia_electricity())?;
    let verdict = runner.run_check(&check, &document, &cancel).await?;
    report(&verdict, format)
}

/// Prints the verdict. A failing verdict exits with code 1 for CI/CD.
pub fn report(verdict: &Verdict, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(verdict)?),
        OutputFormat::Text => {
            println!("Check: {} ({})", verdict.check_name, verdict.check_id);
            println!("Result: {}", verdict.result);
            println!("Checked at: {}", verdict.timestamp.to_rfc3339());
            println!();
            println!("{}", verdict.description);
        }
    }

    if !verdict.passed() {
        eprintln!("\n❌ FAILURE. Check '{}' did not pass.", verdict.check_name);
        std::process::exit(1);
    }
    Ok(())
}

