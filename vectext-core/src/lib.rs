//! Core domain types for the vectext ASCII vector codec.
//!
//! The crate models the geometric features exchanged by the codec, the
//! header metadata carried alongside them, and the collaborator traits the
//! codec talks to: a [`FeatureStore`] holding the features and an
//! [`AttributeDriver`] exposing the relational attribute tables.
//!
//! Invariants:
//! - No global mutable state. Scratch buffers are owned by a single pass.
//! - Collaborator resources are released on drop.

#![forbid(unsafe_code)]

pub mod attribute;
pub mod buffer;
pub mod feature;
pub mod header;
pub mod region;
pub mod selection;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use attribute::{AttributeConnection, AttributeDriver, AttributeError, ColumnType, ColumnValue};
pub use buffer::{BufferError, CoordinateBuffer, GROWTH_CHUNK};
pub use feature::{CategoryTag, Feature, FeatureType, FormatVersion, Vertex};
pub use header::HeaderMetadata;
pub use region::Region;
pub use selection::SelectionSet;
pub use store::{FeatureStore, FeatureStoreError, FieldBinding, MemoryFeatureStore};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteFeatureStore, SqliteFeatureStoreError};
