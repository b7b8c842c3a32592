//! Command-line interface for the ASCII vector codec.
//!
//! `import` decodes an ASCII vector file into a SQLite map, `export` writes a
//! map back out as standard records or a point list, and `bind` links a map
//! layer to an attribute table so exports can filter and join on it.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod bind;
mod error;
mod export;
mod fs;
mod import;

use bind::BindArgs;
pub use error::CliError;
use export::ExportArgs;
use import::ImportArgs;

const ARG_INPUT: &str = "input";
const ARG_MAP: &str = "map";
const ARG_TABLE: &str = "table";
const ARG_DATABASE: &str = "database";
const ARG_REGION: &str = "region";
const ARG_FORMAT_VERSION: &str = "format-version";
const ENV_IMPORT_INPUT: &str = "VECTEXT_CMDS_IMPORT_INPUT";
const ENV_IMPORT_MAP: &str = "VECTEXT_CMDS_IMPORT_MAP";
const ENV_EXPORT_MAP: &str = "VECTEXT_CMDS_EXPORT_MAP";
const ENV_BIND_MAP: &str = "VECTEXT_CMDS_BIND_MAP";
const ENV_BIND_TABLE: &str = "VECTEXT_CMDS_BIND_TABLE";
const ENV_BIND_DATABASE: &str = "VECTEXT_CMDS_BIND_DATABASE";

/// Run the vectext CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    dispatch(cli.command)
}

fn dispatch(command: Command) -> Result<(), CliError> {
    match command {
        Command::Import(args) => import::run_import(args).map(|_| ()),
        Command::Export(args) => export::run_export(args),
        Command::Bind(args) => bind::run_bind(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "vectext",
    about = "Convert between ASCII vector files and SQLite maps",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode an ASCII vector file into a map.
    Import(ImportArgs),
    /// Write a map as ASCII records or a point list.
    Export(ExportArgs),
    /// Link a map layer to an attribute table.
    Bind(BindArgs),
}

#[cfg(test)]
mod tests;
