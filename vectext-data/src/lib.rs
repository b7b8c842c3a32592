//! Codec for the line-oriented ASCII vector exchange format.
//!
//! Responsibilities:
//! - Decode header blocks and feature records into a [`FeatureStore`].
//! - Encode stored features as standard records or point lists, optionally
//!   filtered and joined against attribute tables.
//! - Provide a SQLite attribute-table driver.
//!
//! Boundaries:
//! - Domain types and collaborator traits live in `vectext-core`.
//! - Argument parsing and logger set-up belong to the CLI.
//!
//! Invariants:
//! - Every pass owns its scratch buffers; nothing is shared between passes.
//! - Attribute connections are released on every exit path.
//!
//! [`FeatureStore`]: vectext_core::FeatureStore

#![forbid(unsafe_code)]

pub mod ascii;
pub mod attributes;

pub use ascii::{
    AsciiEncoder, AsciiReader, COMMENT_MARKER, CategorySelector, DecodeError, DecodeSummary,
    EncodeError, EncodeOptions, EncodeSummary, HEADER_SENTINEL, OutputMode, RecordSection, Warning,
    format_decimal, trim_decimal, write_header,
};
pub use attributes::{SQLITE_DRIVER, SqliteAttributeDriver};
