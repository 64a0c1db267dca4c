// digichecks/src/commands/companies.rs

use comfy_table::Table;

use super::context::AppContext;
use crate::cli::CompanyCommand;

pub fn execute(app: &AppContext, command: CompanyCommand) -> anyhow::Result<()> {
    match command {
        CompanyCommand::Add { name } => {
            let company = app.registry.add_company(name);
            app.persist()?;
            println!("✨ Company created: {}", company.public_id);
        }
        CompanyCommand::List => {
            let mut table = Table::new();
            table.set_header(vec!["company_id", "name"]);
            for company in app.registry.companies() {
                table.add_row(vec![company.public_id.to_string(), company.name]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
