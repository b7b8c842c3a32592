//! Error and warning types raised by the ASCII codec.

use std::{fmt, io};

use log::warn;
use thiserror::Error;
use vectext_core::{AttributeError, BufferError, FeatureStoreError, FeatureType};

/// Part of a feature record that was cut short by end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSection {
    /// Vertex lines.
    Coordinates,
    /// Category lines.
    Categories,
}

impl fmt::Display for RecordSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Coordinates => "coordinates",
            Self::Categories => "categories",
        })
    }
}

/// Fatal conditions that abort a decode pass.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Reading the input failed.
    #[error("failed to read ASCII input: {source}")]
    Io {
        /// Underlying I/O failure.
        #[from]
        source: io::Error,
    },
    /// A header line has no `keyword: value` separator.
    #[error("unexpected data in vector head at line {line_number}: [{line}]")]
    MalformedHeaderLine {
        /// One-based line number.
        line_number: usize,
        /// Raw line text.
        line: String,
    },
    /// A feature header lacks the type or vertex count.
    #[error("error reading ASCII file at line {line_number}: (bad type) [{line}]")]
    MalformedRecordHeader {
        /// One-based line number.
        line_number: usize,
        /// Raw line text.
        line: String,
    },
    /// A feature header declares a negative vertex or category count.
    #[error("error reading ASCII file at line {line_number}: (negative count) [{line}]")]
    NegativeCount {
        /// One-based line number.
        line_number: usize,
        /// Raw line text.
        line: String,
    },
    /// A feature header starts with a character that names no feature type.
    #[error("error reading ASCII file at line {line_number}: (unknown type '{tag}') [{line}]")]
    UnknownFeatureType {
        /// One-based line number.
        line_number: usize,
        /// Offending type character.
        tag: char,
        /// Raw line text.
        line: String,
    },
    /// A vertex line does not hold two or three numbers.
    #[error("error reading ASCII file at line {line_number}: (bad point) [{line}]")]
    MalformedVertex {
        /// One-based line number.
        line_number: usize,
        /// Raw line text.
        line: String,
    },
    /// A category line does not hold two unsigned integers.
    #[error("error reading categories at line {line_number}: [{line}]")]
    MalformedCategory {
        /// One-based line number.
        line_number: usize,
        /// Raw line text.
        line: String,
    },
    /// Input ended inside a feature record.
    #[error("end of ASCII file reached before end of {section} (record at line {record_line})")]
    UnexpectedEof {
        /// Section being read.
        section: RecordSection,
        /// Line number of the record header.
        record_line: usize,
    },
    /// The coordinate buffer could not grow.
    #[error("out of memory while collecting coordinates")]
    Buffer {
        /// Allocation failure.
        #[from]
        source: BufferError,
    },
    /// The feature store rejected a feature.
    #[error(transparent)]
    Store(#[from] FeatureStoreError),
}

/// Fatal conditions that abort an encode pass.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Writing the output failed.
    #[error("failed to write ASCII output: {source}")]
    Io {
        /// Underlying I/O failure.
        #[from]
        source: io::Error,
    },
    /// The feature store failed while iterating.
    #[error(transparent)]
    Store(#[from] FeatureStoreError),
    /// No attribute table is linked to the requested layer.
    #[error("database connection not defined for layer {layer}")]
    MissingFieldBinding {
        /// Requested layer.
        layer: u32,
    },
    /// Attribute access was requested without a driver.
    #[error("no attribute driver available for layer {layer}")]
    NoAttributeDriver {
        /// Requested layer.
        layer: u32,
    },
    /// The attribute database could not be opened.
    #[error(transparent)]
    OpenDatabase(AttributeError),
    /// The key-selection query failed.
    #[error("unable to select categories from table <{table}>")]
    SelectKeys {
        /// Attribute table.
        table: String,
        /// Driver failure.
        #[source]
        source: AttributeError,
    },
    /// Reading an attribute value failed.
    #[error("unable to select record from table <{table}> (key {key_column}, column {column})")]
    SelectValue {
        /// Attribute table.
        table: String,
        /// Key column.
        key_column: String,
        /// Requested column.
        column: String,
        /// Driver failure.
        #[source]
        source: AttributeError,
    },
    /// A requested column does not exist.
    #[error("column <{column}> not found in table <{table}>")]
    ColumnNotFound {
        /// Requested column.
        column: String,
        /// Attribute table.
        table: String,
    },
    /// A requested column has a type the encoder cannot format.
    #[error("column <{column}>: unsupported data type {declared}")]
    UnsupportedColumnType {
        /// Requested column.
        column: String,
        /// Declared column type.
        declared: String,
    },
}

/// Non-fatal conditions reported while decoding or encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A header line used a keyword the codec does not know.
    UnknownHeaderKeyword {
        /// One-based line number.
        line_number: usize,
        /// Raw line text.
        line: String,
    },
    /// A numeric header value carried text after its leading number.
    LooseHeaderValue {
        /// One-based line number.
        line_number: usize,
        /// Header keyword.
        keyword: String,
        /// Text after the colon.
        value: String,
    },
    /// A feature carries several categories in the exported layer.
    ExtraCategories {
        /// Category that was exported.
        exported: u32,
        /// Number of categories in the layer.
        count: usize,
    },
    /// A stored feature has no text tag and was written as `X`.
    UnknownFeatureType {
        /// Kind of the stored feature.
        kind: FeatureType,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHeaderKeyword { line_number, line } => {
                write!(f, "unknown keyword <{line}> in vector head at line {line_number}")
            }
            Self::LooseHeaderValue {
                line_number,
                keyword,
                value,
            } => write!(
                f,
                "ignoring text after the number for {keyword} at line {line_number}: [{value}]"
            ),
            Self::ExtraCategories { exported, count } => write!(
                f,
                "feature has {count} categories; only the first category ({exported}) is exported"
            ),
            Self::UnknownFeatureType { kind } => write!(f, "got feature of type {kind}"),
        }
    }
}

/// Log `warning` and keep it for the caller.
pub(crate) fn record(warnings: &mut Vec<Warning>, warning: Warning) {
    warn!("{warning}");
    warnings.push(warning);
}
