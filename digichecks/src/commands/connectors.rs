// digichecks/src/commands/connectors.rs

use comfy_table::Table;

use digichecks_core::domain::check::{ConnectorDraft, PublicId, Secret};

use super::context::AppContext;
use crate::cli::ConnectorCommand;

pub fn execute(app: &AppContext, command: ConnectorCommand) -> anyhow::Result<()> {
    match command {
        ConnectorCommand::List { company } => {
            let connectors = app
                .registry_service(app.vault_or_ephemeral()?)
                .list_connectors(&PublicId::from(company))?;

            let mut table = Table::new();
            table.set_header(vec!["connector_id", "name", "username", "token_endpoint", "updated_at"]);
            for c in connectors {
                table.add_row(vec![
                    c.connector_id.to_string(),
                    c.name,
                    c.username,
                    c.token_endpoint.unwrap_or_default(),
                    c.updated_at.to_rfc3339(),
                ]);
            }
            println!("{table}");
        }
        ConnectorCommand::Add {
            company,
            name,
            username,
            password,
            token_endpoint,
        } => {
            // Storing a credential needs the real key.
            let view = app.registry_service(app.vault()?).create_connector(
                &PublicId::from(company),
                ConnectorDraft {
                    name,
                    username,
                    password: Secret::new(password),
                    token_endpoint,
                },
            )?;
            app.persist()?;
            println!("✨ Connector created: {}", view.connector_id);
        }
    }
    Ok(())
}
