//! Export command implementation for the vectext CLI.

use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use vectext_core::{FormatVersion, Region, SqliteFeatureStore};
use vectext_data::{
    AsciiEncoder, EncodeOptions, EncodeSummary, OutputMode, SqliteAttributeDriver,
};

use crate::{
    ARG_FORMAT_VERSION, ARG_MAP, ARG_REGION, CliError, ENV_EXPORT_MAP,
    fs::{create_utf8_file, require_existing},
};

/// Output layout selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExportFormat {
    /// Header block followed by multi-line records.
    #[default]
    Standard,
    /// One separator-joined line per point-like feature.
    Point,
}

impl From<ExportFormat> for OutputMode {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Standard => Self::Standard,
            ExportFormat::Point => Self::Point,
        }
    }
}

/// CLI arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "export",
    long_about = "Write the live features of a SQLite map as ASCII. The \
                 standard format writes the header block and every record; \
                 the point format writes one line per point or centroid, \
                 optionally filtered and joined against the attribute table \
                 bound to the chosen layer.",
    about = "Write a map as ASCII records or a point list"
)]
#[ortho_config(prefix = "VECTEXT")]
pub(crate) struct ExportArgs {
    /// Path to the SQLite map to export.
    #[arg(long = ARG_MAP, value_name = "path")]
    #[serde(default)]
    pub(crate) map: Option<Utf8PathBuf>,
    /// Write to this file instead of standard output.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Write legacy label records to this file.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) companion: Option<Utf8PathBuf>,
    /// Output layout.
    #[arg(long, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<ExportFormat>,
    /// Format revision to write (4 or 5).
    #[arg(long = ARG_FORMAT_VERSION, value_name = "n")]
    #[serde(default)]
    pub(crate) format_version: Option<u8>,
    /// Decimal places written before trailing zeros are trimmed.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) precision: Option<usize>,
    /// Field separator for the point format.
    #[arg(long, value_name = "text")]
    #[serde(default)]
    pub(crate) separator: Option<String>,
    /// Clip point output to `west,south,east,north[,bottom,top]`.
    #[arg(long = ARG_REGION, value_name = "edges", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) region: Option<String>,
    /// Layer whose categories and attribute table are used.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) layer: Option<u32>,
    /// Attribute row filter, as an SQL condition.
    #[arg(long = "where", value_name = "sql")]
    #[serde(default)]
    pub(crate) filter: Option<String>,
    /// Attribute columns appended to each point line.
    #[arg(long, value_name = "names", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) columns: Option<Vec<String>>,
}

impl ExportArgs {
    pub(crate) fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExportConfig::try_from(merged)
    }
}

/// Resolved `export` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExportConfig {
    pub(crate) map: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) companion: Option<Utf8PathBuf>,
    pub(crate) options: EncodeOptions,
}

impl ExportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.map, ARG_MAP)
    }
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = CliError;

    fn try_from(args: ExportArgs) -> Result<Self, Self::Error> {
        let map = args.map.ok_or(CliError::MissingArgument {
            field: ARG_MAP,
            env: ENV_EXPORT_MAP,
        })?;
        let version = match args.format_version {
            None | Some(5) => FormatVersion::Current,
            Some(4) => FormatVersion::Legacy,
            Some(version) => return Err(CliError::UnsupportedFormatVersion { version }),
        };
        let region = args.region.as_deref().map(parse_region).transpose()?;

        let defaults = EncodeOptions::default();
        let options = EncodeOptions {
            version,
            mode: args.format.unwrap_or_default().into(),
            precision: args.precision.unwrap_or(defaults.precision),
            separator: args.separator.unwrap_or(defaults.separator),
            region,
            layer: args.layer.unwrap_or(defaults.layer),
            filter: args.filter.filter(|clause| !clause.trim().is_empty()),
            columns: args.columns.unwrap_or_default(),
        };
        Ok(Self {
            map,
            output: args.output,
            companion: args.companion,
            options,
        })
    }
}

/// Parse `west,south,east,north` with an optional `,bottom,top` suffix.
pub(crate) fn parse_region(value: &str) -> Result<Region, CliError> {
    let invalid = || CliError::InvalidRegion {
        value: value.to_owned(),
    };
    let edges = value
        .split(',')
        .map(|edge| edge.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    if edges.iter().any(|edge| !edge.is_finite()) {
        return Err(invalid());
    }
    let (west, south, east, north, depth) = match edges.as_slice() {
        &[west, south, east, north] => (west, south, east, north, None),
        &[west, south, east, north, bottom, top] => {
            (west, south, east, north, Some((bottom, top)))
        }
        _ => return Err(invalid()),
    };
    if west > east || south > north || depth.is_some_and(|(bottom, top)| bottom > top) {
        return Err(invalid());
    }
    let region = Region::new(west, south, east, north);
    Ok(match depth {
        Some((bottom, top)) => region.with_depth(bottom, top),
        None => region,
    })
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    match config.output.as_deref() {
        Some(path) => {
            let mut file = create_output(path)?;
            export_with(&config, &mut file)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            export_with(&config, &mut stdout)?;
        }
    }
    Ok(())
}

/// Encode the map named by `config` into `output`.
pub(crate) fn export_with(
    config: &ExportConfig,
    output: &mut dyn Write,
) -> Result<EncodeSummary, CliError> {
    let mut store =
        SqliteFeatureStore::open(config.map.as_std_path()).map_err(|source| CliError::OpenMap {
            path: config.map.clone(),
            source,
        })?;
    let mut companion = config
        .companion
        .as_deref()
        .map(create_output)
        .transpose()?
        .map(BufWriter::new);
    let driver = SqliteAttributeDriver;
    let encoder = AsciiEncoder::new(&config.options).with_attribute_driver(&driver);
    let mut output = BufWriter::new(output);
    let summary = encoder.encode_document(
        &mut store,
        &mut output,
        companion.as_mut().map(|writer| writer as &mut dyn Write),
    )?;
    info!(
        "exported {} features from {} ({} skipped, {} companion records)",
        summary.written, config.map, summary.skipped, summary.companion
    );
    Ok(summary)
}

fn create_output(path: &Utf8Path) -> Result<cap_std::fs_utf8::File, CliError> {
    create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })
}
