//! Error types emitted by the vectext CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use vectext_core::SqliteFeatureStoreError;
use vectext_data::{DecodeError, EncodeError};

/// Errors emitted by the vectext CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The clipping region is not `west,south,east,north[,bottom,top]`.
    #[error("invalid region {value:?} (expected west,south,east,north[,bottom,top])")]
    InvalidRegion { value: String },
    /// Only revisions 4 and 5 of the format can be written.
    #[error("unsupported format version {version} (expected 4 or 5)")]
    UnsupportedFormatVersion { version: u8 },
    /// Opening the ASCII input failed.
    #[error("failed to open ASCII input at {path:?}: {source}")]
    OpenInput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Creating an output file failed.
    #[error("failed to create output at {path:?}: {source}")]
    CreateOutput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or creating the map failed.
    #[error("failed to open map at {path:?}: {source}")]
    OpenMap {
        path: Utf8PathBuf,
        #[source]
        source: SqliteFeatureStoreError,
    },
    /// Persisting map metadata failed.
    #[error("failed to update map at {path:?}: {source}")]
    UpdateMap {
        path: Utf8PathBuf,
        #[source]
        source: SqliteFeatureStoreError,
    },
    /// The ASCII input could not be decoded.
    #[error("failed to import {path:?}: {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: DecodeError,
    },
    /// Writing the map as ASCII failed.
    #[error("failed to export map: {0}")]
    Encode(#[from] EncodeError),
}
