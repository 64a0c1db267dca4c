// digichecks/src/commands/checks.rs

use anyhow::Context;
use comfy_table::Table;
use std::fs;

use digichecks_core::application::CheckRequest;
use digichecks_core::domain::check::PublicId;

use super::context::AppContext;
use crate::cli::CheckCommand;

pub fn execute(app: &AppContext, command: CheckCommand) -> anyhow::Result<()> {
    match command {
        CheckCommand::List { company } => {
            // Listing never touches credentials.
            let checks = app
                .registry_service(app.vault_or_ephemeral()?)
                .list_checks(&PublicId::from(company))?;

            let mut table = Table::new();
            table.set_header(vec!["check_id", "name", "rule_source", "connector_id"]);
            for check in checks {
                table.add_row(vec![
                    check.check_id.to_string(),
                    check.check_name,
                    check.rule_source.to_string(),
                    check
                        .connector_id
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        CheckCommand::Add {
            company,
            name,
            rule_source,
            rule,
            rule_file,
            connector,
        } => {
            let rule = match (rule, rule_file) {
                (Some(rule), _) => rule,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read rule {:?}", path))?,
                (None, None) => anyhow::bail!("Either --rule or --rule-file is required"),
            };
            let view = app
                .registry_service(app.vault_or_ephemeral()?)
                .create_check(
                    &PublicId::from(company),
                    CheckRequest {
                        name,
                        rule_source,
                        rule,
                        connector: connector.map(PublicId::from),
                    },
                )?;
            app.persist()?;
            println!("✨ Check created: {}", view.check_id);
        }
        CheckCommand::Remove { company, check } => {
            app.registry_service(app.vault_or_ephemeral()?)
                .delete_check(&PublicId::from(company), &PublicId::from(check.as_str()))?;
            app.persist()?;
            println!("🗑️  Check removed: {}", check);
        }
    }
    Ok(())
}
