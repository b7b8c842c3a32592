//! Sorted category-id sets used to filter exported features.

use crate::Feature;

/// Sorted, de-duplicated set of selected category ids.
///
/// An empty set is a legitimate filter that selects nothing; the absence of
/// a filter is modelled by not having a `SelectionSet` at all.
///
/// # Examples
/// ```
/// use vectext_core::{CategoryTag, Feature, FeatureType, SelectionSet};
///
/// let set = SelectionSet::from_unsorted(vec![9, 3, 5, 3]);
/// assert_eq!(set.ids(), &[3, 5, 9]);
///
/// let feature = Feature::new(
///     FeatureType::Line,
///     Vec::new(),
///     vec![CategoryTag::new(1, 4), CategoryTag::new(2, 5)],
/// );
/// assert!(set.matches(&feature));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: Vec<u32>,
}

impl SelectionSet {
    /// Build a set from ids in any order.
    #[must_use]
    pub fn from_unsorted(mut ids: Vec<u32>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Whether `id` is selected. `O(log n)`.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Whether any category of `feature`, in any layer, is selected.
    #[must_use]
    pub fn matches(&self, feature: &Feature) -> bool {
        feature
            .categories
            .iter()
            .any(|tag| self.contains(tag.category))
    }

    /// Selected ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Number of selected ids.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the filter selects nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<u32> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}
