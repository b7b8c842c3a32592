//! Property-based tests for the core model.
//!
//! # Invariants tested
//!
//! - **Buffer integrity:** growing the coordinate buffer never drops or
//!   reorders vertices, whatever the growth-chunk boundaries.
//! - **Bounded reallocation:** the number of growths is `ceil(n / chunk)`.
//! - **Selection membership:** a feature is selected iff one of its
//!   categories is in the set.

use proptest::prelude::*;
use vectext_core::{
    CategoryTag, CoordinateBuffer, Feature, FeatureType, GROWTH_CHUNK, SelectionSet, Vertex,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: drained vertices equal the pushed vertices in order.
    #[test]
    fn buffer_preserves_vertices(
        vertices in prop::collection::vec((any::<i32>(), any::<i32>(), any::<i16>()), 0..3500)
    ) {
        let expected: Vec<Vertex> = vertices
            .iter()
            .map(|&(x, y, z)| Vertex::new(f64::from(x), f64::from(y), f64::from(z)))
            .collect();
        let mut buffer = CoordinateBuffer::new();
        for vertex in &expected {
            buffer.push(*vertex).expect("push vertex");
        }
        prop_assert_eq!(buffer.len(), expected.len());
        prop_assert_eq!(buffer.growths(), expected.len().div_ceil(GROWTH_CHUNK));
        prop_assert_eq!(buffer.drain_vertices(), expected);
        prop_assert!(buffer.is_empty());
    }

    /// Property: membership matches a linear scan of the selected ids.
    #[test]
    fn selection_matches_any_category(
        selected in prop::collection::vec(0_u32..50, 0..20),
        categories in prop::collection::vec(0_u32..50, 0..6),
    ) {
        let set = SelectionSet::from_unsorted(selected.clone());
        let feature = Feature::new(
            FeatureType::Line,
            Vec::new(),
            categories.iter().map(|id| CategoryTag::new(1, *id)).collect(),
        );
        let expected = categories.iter().any(|id| selected.contains(id));
        prop_assert_eq!(set.matches(&feature), expected);
        prop_assert!(set.ids().windows(2).all(|pair| pair[0] < pair[1]));
    }
}
