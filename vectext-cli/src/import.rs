//! Import command implementation for the vectext CLI.

use std::io::BufReader;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use vectext_core::SqliteFeatureStore;
use vectext_data::{AsciiReader, DecodeSummary};

use crate::{
    ARG_INPUT, ARG_MAP, CliError, ENV_IMPORT_INPUT, ENV_IMPORT_MAP,
    fs::{open_utf8_file, require_existing},
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "import",
    long_about = "Decode an ASCII vector file into a SQLite map. The map is \
                 created when it does not exist; features are appended to \
                 an existing map.",
    about = "Decode an ASCII vector file into a map"
)]
#[ortho_config(prefix = "VECTEXT")]
pub(crate) struct ImportArgs {
    /// Path to the ASCII vector file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Path to the SQLite map receiving the features.
    #[arg(long = ARG_MAP, value_name = "path")]
    #[serde(default)]
    pub(crate) map: Option<Utf8PathBuf>,
    /// The input starts with the first record instead of a header block.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "bool")]
    #[serde(default)]
    pub(crate) no_header: Option<bool>,
    /// Create the map with an elevation coordinate.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "bool")]
    #[serde(default)]
    pub(crate) with_z: Option<bool>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) map: Utf8PathBuf,
    pub(crate) with_header: bool,
    pub(crate) with_z: bool,
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.input, ARG_INPUT)
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_IMPORT_INPUT,
        })?;
        let map = args.map.ok_or(CliError::MissingArgument {
            field: ARG_MAP,
            env: ENV_IMPORT_MAP,
        })?;
        Ok(Self {
            input,
            map,
            with_header: !args.no_header.unwrap_or(false),
            with_z: args.with_z.unwrap_or(false),
        })
    }
}

pub(crate) fn run_import(args: ImportArgs) -> Result<DecodeSummary, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    import_with(&config)
}

/// Decode `config.input` into the map at `config.map`.
///
/// Features committed before a decode failure stay in the map.
pub(crate) fn import_with(config: &ImportConfig) -> Result<DecodeSummary, CliError> {
    let file = open_utf8_file(&config.input).map_err(|source| CliError::OpenInput {
        path: config.input.clone(),
        source,
    })?;
    let mut store = SqliteFeatureStore::create(config.map.as_std_path(), config.with_z)
        .map_err(|source| CliError::OpenMap {
            path: config.map.clone(),
            source,
        })?;
    let summary = AsciiReader::new(BufReader::new(file))
        .read_document(&mut store, config.with_header)
        .map_err(|source| CliError::Decode {
            path: config.input.clone(),
            source,
        })?;
    if config.with_header {
        store.save_header().map_err(|source| CliError::UpdateMap {
            path: config.map.clone(),
            source,
        })?;
    }
    info!(
        "imported {} features from {} into {} ({} dead records discarded)",
        summary.committed, config.input, config.map, summary.dead
    );
    Ok(summary)
}
