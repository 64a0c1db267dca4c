// digichecks/src/commands/convert.rs
//
// USE CASE: Spreadsheet -> JSON-LD, without running any check.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use digichecks_core::domain::conversion::DatasetType;

use super::context::{AppContext, resolve_profile};
use crate::cli::ConversionArgs;

pub async fn execute(
    app: &AppContext,
    input: &Path,
    dataset_type: &str,
    conversion: &ConversionArgs,
    output: Option<PathBuf>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let kind: DatasetType = dataset_type.parse()?;
    let profile = resolve_profile(conversion)?;
    let bytes = fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;

    let document = app
        .conversion(&profile)
        .convert_dataset(kind, &bytes, &profile.mapping, &profile.namespaces, &cancel)
        .await?;
    let rendered = serde_json::to_string_pretty(&document.to_value())?;

    match output {
        Some(path) => {
            fs::write(&path, rendered).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!(
                "✨ {} nodes written to {}",
                document.graph.len(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
