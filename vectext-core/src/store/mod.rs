//! Feature store collaborators.
//!
//! The [`FeatureStore`] trait is the codec's only view of persisted features:
//! append on import, a rewindable sequential cursor on export, header metadata
//! and the attribute-table binding of each layer.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{Feature, FeatureType, HeaderMetadata};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryFeatureStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteFeatureStore, SqliteFeatureStoreError};

/// Attribute table linked to one layer of a map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldBinding {
    /// Layer number the binding applies to.
    pub layer: u32,
    /// Attribute table name.
    pub table: String,
    /// Primary-key column holding category ids.
    pub key_column: String,
    /// Database identifier understood by the driver.
    pub database: String,
    /// Driver name.
    pub driver: String,
}

/// Errors surfaced by feature stores.
#[derive(Debug, Error)]
pub enum FeatureStoreError {
    /// Persisting a feature failed.
    #[error("failed to append {kind} feature: {source}")]
    Append {
        /// Kind of the rejected feature.
        kind: FeatureType,
        /// Backend failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// Reading the next feature failed.
    #[error("failed to read feature after position {position}: {source}")]
    Read {
        /// Number of features the cursor had already returned.
        position: usize,
        /// Backend failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// Resetting the cursor failed.
    #[error("failed to rewind feature cursor: {source}")]
    Rewind {
        /// Backend failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Sequentially readable, appendable collection of features.
///
/// The cursor visits live features in the store's natural order and skips
/// deleted ones.
///
/// # Examples
///
/// ```rust
/// use vectext_core::{Feature, FeatureStore, FeatureType, MemoryFeatureStore, Vertex};
///
/// # fn main() -> Result<(), vectext_core::FeatureStoreError> {
/// let mut store = MemoryFeatureStore::new();
/// store.append_feature(&Feature::new(
///     FeatureType::Point,
///     vec![Vertex::planar(1.0, 2.0)],
///     Vec::new(),
/// ))?;
///
/// store.rewind()?;
/// let first = store.read_next()?.map(|feature| feature.kind);
/// assert_eq!(first, Some(FeatureType::Point));
/// assert!(store.read_next()?.is_none());
/// # Ok(())
/// # }
/// ```
pub trait FeatureStore {
    /// Persist a feature at the end of the store.
    fn append_feature(&mut self, feature: &Feature) -> Result<(), FeatureStoreError>;

    /// Reset the cursor to the first feature.
    fn rewind(&mut self) -> Result<(), FeatureStoreError>;

    /// Return the next live feature, or `None` at end of input.
    fn read_next(&mut self) -> Result<Option<Feature>, FeatureStoreError>;

    /// Attribute-table binding of `layer`, if one is defined.
    fn field_binding(&self, layer: u32) -> Option<FieldBinding>;

    /// Header metadata of the map.
    fn header(&self) -> &HeaderMetadata;

    /// Mutable header metadata of the map.
    fn header_mut(&mut self) -> &mut HeaderMetadata;

    /// Whether vertices carry meaningful elevations.
    fn is_3d(&self) -> bool;
}
