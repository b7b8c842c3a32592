//! Vector-backed [`FeatureStore`] for small maps and tests.

use std::collections::HashMap;

use crate::{Feature, HeaderMetadata};

use super::{FeatureStore, FeatureStoreError, FieldBinding};

#[derive(Debug, Clone)]
struct Slot {
    feature: Feature,
    alive: bool,
}

/// In-memory map. Deleted features stay in place and are skipped by the
/// cursor.
#[derive(Debug, Default)]
pub struct MemoryFeatureStore {
    slots: Vec<Slot>,
    cursor: usize,
    header: HeaderMetadata,
    with_z: bool,
    bindings: HashMap<u32, FieldBinding>,
}

impl MemoryFeatureStore {
    /// Create an empty planar store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose vertices carry elevations.
    #[must_use]
    pub fn new_3d() -> Self {
        Self {
            with_z: true,
            ..Self::default()
        }
    }

    /// Create a planar store holding `features`.
    pub fn with_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        Self {
            slots: features
                .into_iter()
                .map(|feature| Slot {
                    feature,
                    alive: true,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Register the attribute table of a layer, replacing any previous one.
    pub fn bind_layer(&mut self, binding: FieldBinding) {
        self.bindings.insert(binding.layer, binding);
    }

    /// Mark the feature at `index` as deleted.
    ///
    /// Returns `false` when no such feature exists.
    pub fn delete(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.alive = false;
                true
            }
            None => false,
        }
    }

    /// Live features in store order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.alive)
            .map(|slot| &slot.feature)
    }

    /// Number of live features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features().count()
    }

    /// Whether the store holds no live features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features().next().is_none()
    }
}

impl FeatureStore for MemoryFeatureStore {
    fn append_feature(&mut self, feature: &Feature) -> Result<(), FeatureStoreError> {
        self.slots.push(Slot {
            feature: feature.clone(),
            alive: true,
        });
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), FeatureStoreError> {
        self.cursor = 0;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Feature>, FeatureStoreError> {
        while let Some(slot) = self.slots.get(self.cursor) {
            self.cursor += 1;
            if slot.alive {
                return Ok(Some(slot.feature.clone()));
            }
        }
        Ok(None)
    }

    fn field_binding(&self, layer: u32) -> Option<FieldBinding> {
        self.bindings.get(&layer).cloned()
    }

    fn header(&self) -> &HeaderMetadata {
        &self.header
    }

    fn header_mut(&mut self) -> &mut HeaderMetadata {
        &mut self.header
    }

    fn is_3d(&self) -> bool {
        self.with_z
    }
}
