use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reservation_sync")]
#[command(about = "Keep a reservations table in step with the Airbnb host export")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database holding the reservations table
    #[arg(long, global = true, env = "RESERVATION_SYNC_DB", default_value = "reservations.sqlite3")]
    pub db: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download reservations from Airbnb and merge them in
    Sync(SyncArgs),
    /// Merge a reservations CSV exported by hand
    Import(ImportArgs),
    /// Write the reservations table to an .xlsx workbook
    Export(ExportArgs),
    /// Show or change configuration
    Config(ConfigArgs),
    /// List recent sync runs
    Runs,
}

#[derive(clap::Args)]
pub struct SyncArgs {
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Path to the CSV file
    pub file: PathBuf,
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Destination .xlsx path
    pub file: PathBuf,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show all config values
    Show,
    /// Set a config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
