//! Bind command implementation for the vectext CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use vectext_core::{FieldBinding, SqliteFeatureStore};
use vectext_data::SQLITE_DRIVER;

use crate::{
    ARG_DATABASE, ARG_MAP, ARG_TABLE, CliError, ENV_BIND_DATABASE, ENV_BIND_MAP, ENV_BIND_TABLE,
    fs::require_existing,
};

const DEFAULT_KEY_COLUMN: &str = "cat";

/// CLI arguments for the `bind` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "bind",
    long_about = "Record which attribute table holds the rows for one layer \
                 of a map. Exports use the binding to filter features and \
                 to append attribute columns.",
    about = "Link a map layer to an attribute table"
)]
#[ortho_config(prefix = "VECTEXT")]
pub(crate) struct BindArgs {
    /// Path to the SQLite map.
    #[arg(long = ARG_MAP, value_name = "path")]
    #[serde(default)]
    pub(crate) map: Option<Utf8PathBuf>,
    /// Layer to bind (defaults to 1).
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) layer: Option<u32>,
    /// Attribute table name.
    #[arg(long = ARG_TABLE, value_name = "name")]
    #[serde(default)]
    pub(crate) table: Option<String>,
    /// Key column holding category ids (defaults to `cat`).
    #[arg(long, value_name = "column")]
    #[serde(default)]
    pub(crate) key: Option<String>,
    /// Database holding the attribute table.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<String>,
    /// Attribute driver name (defaults to `sqlite`).
    #[arg(long, value_name = "name")]
    #[serde(default)]
    pub(crate) driver: Option<String>,
}

impl BindArgs {
    pub(crate) fn into_config(self) -> Result<BindConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BindConfig::try_from(merged)
    }
}

/// Resolved `bind` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BindConfig {
    pub(crate) map: Utf8PathBuf,
    pub(crate) binding: FieldBinding,
}

impl TryFrom<BindArgs> for BindConfig {
    type Error = CliError;

    fn try_from(args: BindArgs) -> Result<Self, Self::Error> {
        let map = args.map.ok_or(CliError::MissingArgument {
            field: ARG_MAP,
            env: ENV_BIND_MAP,
        })?;
        let table = args.table.ok_or(CliError::MissingArgument {
            field: ARG_TABLE,
            env: ENV_BIND_TABLE,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_BIND_DATABASE,
        })?;
        Ok(Self {
            map,
            binding: FieldBinding {
                layer: args.layer.unwrap_or(1),
                table,
                key_column: args.key.unwrap_or_else(|| DEFAULT_KEY_COLUMN.to_owned()),
                database,
                driver: args.driver.unwrap_or_else(|| SQLITE_DRIVER.to_owned()),
            },
        })
    }
}

pub(crate) fn run_bind(args: BindArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.map, ARG_MAP)?;
    bind_with(config)
}

pub(crate) fn bind_with(config: BindConfig) -> Result<(), CliError> {
    let mut store =
        SqliteFeatureStore::open(config.map.as_std_path()).map_err(|source| CliError::OpenMap {
            path: config.map.clone(),
            source,
        })?;
    info!(
        "binding layer {} of {} to table {}",
        config.binding.layer, config.map, config.binding.table
    );
    store
        .bind_layer(config.binding)
        .map_err(|source| CliError::UpdateMap {
            path: config.map,
            source,
        })
}
