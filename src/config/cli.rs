use crate::domain::model::ContractModel;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gamefik-validator")]
#[command(about = "Validates school sales deals: CRM screenshots and the signed contract")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "GAMEFIK_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the validation dashboard and JSON API (default)
    Serve {
        #[arg(long)]
        host: Option<String>,

        /// Overrides the PORT environment variable
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the text extracted from a PDF or screenshot
    Extract { file: PathBuf },

    /// Run the CRM flow over one or more screenshots
    Crm {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the contract flow over a PDF
    Contract {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect which official template a contract follows
    Detect { file: PathBuf },

    /// Compare the clauses of a contract with an official template
    Clauses {
        #[arg(long)]
        model: ContractModel,

        file: PathBuf,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve {
            host: None,
            port: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}
