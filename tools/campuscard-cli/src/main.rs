//! CampusCard CLI: student ID cards and data exports from the command line.
//!
//! Usage:
//!   campuscard export --tenant <ID> --kind <KIND>   Export cards, photos or a spreadsheet
//!   campuscard preview --tenant <ID> --admission-no <NO>   Render a single card
//!   campuscard validate                             Check stored records
//!   campuscard serve                                Run the HTTP API
//!   campuscard check                                Report fonts and configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use campuscard_common::config::{config_file_path, AppConfig};
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "campuscard",
    about = "Student ID card generation and data export",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the XDG config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Export output kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Zip of rendered ID cards
    IdCards,
    /// Zip of original student photos
    Images,
    /// Spreadsheet of student records
    Excel,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a college's records
    Export {
        /// College (tenant) id
        #[arg(long)]
        tenant: String,

        /// What to export
        #[arg(long, value_enum)]
        kind: KindArg,

        /// Card theme: classic or premium
        #[arg(long)]
        theme: Option<String>,

        /// Student records file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output file (defaults to the suggested download name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one student's ID card to a PNG
    Preview {
        /// College (tenant) id
        #[arg(long)]
        tenant: String,

        /// Admission number of the student
        #[arg(long)]
        admission_no: String,

        /// Card theme: classic or premium
        #[arg(long)]
        theme: Option<String>,

        /// Student records file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check every stored record for missing fields and card layout issues
    Validate {
        /// Student records file
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Student records file
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Report font availability and the effective configuration
    Check {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = config_file_path();
    let (mut config, config_error) = match &cli.config {
        Some(path) => (AppConfig::load_from(path)?, None),
        None => AppConfig::load_or_default(&config_path),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    campuscard_common::logging::init_logging(&config.logging);
    if let Some(e) = config_error {
        tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
    }

    match cli.command {
        Commands::Export {
            tenant,
            kind,
            theme,
            data,
            output,
        } => commands::export::run(config, tenant, kind, theme, data, output).await,
        Commands::Preview {
            tenant,
            admission_no,
            theme,
            data,
            output,
        } => commands::preview::run(config, tenant, admission_no, theme, data, output).await,
        Commands::Validate { data } => commands::validate::run(config, data),
        Commands::Serve { bind, data } => commands::serve::run(config, bind, data).await,
        Commands::Check { write_config } => commands::check::run(config, write_config),
    }
}
