//! Facade crate for the ASCII vector codec.
//!
//! This crate re-exports the core data model and the codec, and exposes the
//! SQLite-backed feature store behind the `store-sqlite` feature flag.

#![forbid(unsafe_code)]

pub use vectext_core::{
    AttributeConnection, AttributeDriver, AttributeError, CategoryTag, ColumnType, ColumnValue,
    CoordinateBuffer, Feature, FeatureStore, FeatureStoreError, FeatureType, FieldBinding,
    FormatVersion, HeaderMetadata, MemoryFeatureStore, Region, SelectionSet, Vertex,
};

#[cfg(feature = "store-sqlite")]
pub use vectext_core::{SqliteFeatureStore, SqliteFeatureStoreError};

pub use vectext_data::{
    AsciiEncoder, AsciiReader, CategorySelector, DecodeError, DecodeSummary, EncodeError,
    EncodeOptions, EncodeSummary, OutputMode, SqliteAttributeDriver, Warning, format_decimal,
    write_header,
};
