// digichecks/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "digichecks")]
#[command(about = "SHACL compliance checks over hosted, remote and data-space datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Service configuration file (default: digichecks.yaml in --root)
    #[arg(long, global = true, env = "DIGICHECKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the configuration and the registry
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ✅ Runs a check against a JSON-LD document
    Run {
        /// Company public id (co_...)
        #[arg(long)]
        company: String,

        /// Check public id (ch_...)
        #[arg(long)]
        check: String,

        /// JSON-LD document with '@context' and '@graph'
        #[arg(long)]
        document: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// 🛰️  Fetches a dataset from the data space and runs a check against it
    Dataspace {
        #[arg(long)]
        company: String,

        #[arg(long)]
        check: String,

        /// Dataset (asset) id on the data-space connector
        #[arg(long)]
        dataset_id: String,

        /// excel | csv | JSON-LD
        #[arg(long)]
        dataset_type: String,

        #[command(flatten)]
        conversion: ConversionArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// 🔄 Converts a spreadsheet into a JSON-LD document
    Convert {
        /// Spreadsheet (or JSON-LD) file
        #[arg(long, short)]
        input: PathBuf,

        /// excel | csv | JSON-LD
        #[arg(long = "type", short = 't')]
        dataset_type: String,

        #[command(flatten)]
        conversion: ConversionArgs,

        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 🏢 Manages companies
    #[command(subcommand)]
    Companies(CompanyCommand),

    /// 📋 Manages checks
    #[command(subcommand)]
    Checks(CheckCommand),

    /// 🔌 Manages rule API connectors
    #[command(subcommand)]
    Connectors(ConnectorCommand),

    /// 🔐 Fernet key utilities
    #[command(subcommand)]
    Vault(VaultCommand),
}

#[derive(Args, Debug, Clone)]
pub struct ConversionArgs {
    /// Built-in conversion profile
    #[arg(long, default_value = "realia-electricity")]
    pub profile: String,

    /// YAML map of source column -> element name, replacing the profile's
    #[arg(long)]
    pub mapping: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum CompanyCommand {
    Add {
        #[arg(long)]
        name: String,
    },
    List,
}

#[derive(Subcommand)]
pub enum CheckCommand {
    List {
        #[arg(long)]
        company: String,
    },
    Add {
        #[arg(long)]
        company: String,

        #[arg(long)]
        name: String,

        /// digichecks_hosted | api
        #[arg(long, default_value = "digichecks_hosted")]
        rule_source: String,

        /// Turtle text (hosted) or endpoint URL (api)
        #[arg(long, conflicts_with = "rule_file", required_unless_present = "rule_file")]
        rule: Option<String>,

        /// File holding the Turtle rule
        #[arg(long)]
        rule_file: Option<PathBuf>,

        /// Connector public id, for api checks
        #[arg(long)]
        connector: Option<String>,
    },
    Remove {
        #[arg(long)]
        company: String,

        #[arg(long)]
        check: String,
    },
}

#[derive(Subcommand)]
pub enum ConnectorCommand {
    List {
        #[arg(long)]
        company: String,
    },
    Add {
        #[arg(long)]
        company: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        username: String,

        #[arg(long, env = "DIGICHECKS_CONNECTOR_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        token_endpoint: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum VaultCommand {
    /// Prints a fresh Fernet key
    Keygen,
    /// Encrypts a value with the configured key
    Encrypt {
        #[arg(long, env = "DIGICHECKS_SECRET", hide_env_values = true)]
        value: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
