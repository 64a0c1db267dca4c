// digichecks/src/commands/dataspace.rs
//
// USE CASE: Acquire a dataset from the data space, convert it when tabular,
// then run a check against it.

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::context::{AppContext, dataspace_request, resolve_profile};
use super::run::report;
use crate::cli::{ConversionArgs, OutputFormat};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    app: &AppContext,
    company: &str,
    check: &str,
    dataset_id: String,
    dataset_type: &str,
    conversion: &ConversionArgs,
    format: OutputFormat,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let check = app.find_check(company, check)?;
    let profile = resolve_profile(conversion)?;
    let runner = app.runner(&profile)?;
    let request = dataspace_request(dataset_id, dataset_type, profile)?;

    info!(
        control = %app.config.dataspace.control_host,
        data = %app.config.dataspace.data_host,
        "Acquiring dataset"
    );
    let verdict = runner.run_dataspace_check(&check, &request, &cancel).await?;
    report(&verdict, format)
}
