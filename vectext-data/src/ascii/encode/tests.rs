//! Unit tests for the feature encoder.

use super::*;
use rstest::{fixture, rstest};
use std::io;
use vectext_core::{
    CategoryTag, ColumnType, ColumnValue, FeatureStoreError, FieldBinding, HeaderMetadata,
    MemoryFeatureStore,
    test_support::{MemoryAttributeDriver, MemoryTable},
};

fn feature(kind: FeatureType, vertices: &[(f64, f64)], categories: &[(u32, u32)]) -> Feature {
    Feature::new(
        kind,
        vertices.iter().map(|&(x, y)| Vertex::planar(x, y)).collect(),
        categories
            .iter()
            .map(|&(field, category)| CategoryTag::new(field, category))
            .collect(),
    )
}

fn encode_to_string(
    options: &EncodeOptions,
    store: &mut MemoryFeatureStore,
) -> (String, EncodeSummary) {
    let mut out = Vec::new();
    let summary = AsciiEncoder::new(options)
        .encode(store, &mut out, None)
        .expect("encode");
    (String::from_utf8(out).expect("utf-8"), summary)
}

fn point_options() -> EncodeOptions {
    EncodeOptions {
        mode: OutputMode::Point,
        ..EncodeOptions::default()
    }
}

#[fixture]
fn mixed_store() -> MemoryFeatureStore {
    MemoryFeatureStore::with_features([
        feature(FeatureType::Point, &[(5.0, 5.0)], &[(1, 42)]),
        feature(FeatureType::Line, &[(0.0, 0.0), (2.0, 4.0)], &[(1, 7), (2, 9)]),
        feature(FeatureType::Centroid, &[(1.3, 2.5)], &[]),
        feature(FeatureType::Boundary, &[(0.0, 0.0), (1.0, 1.0)], &[]),
    ])
}

#[rstest]
fn standard_output_matches_the_canonical_layout(mut mixed_store: MemoryFeatureStore) {
    let options = EncodeOptions {
        precision: 2,
        ..EncodeOptions::default()
    };
    let (text, summary) = encode_to_string(&options, &mut mixed_store);
    let expected = concat!(
        "P  1 1\n",
        " 5            5           \n",
        " 1     42        \n",
        "L  2 2\n",
        " 0            0           \n",
        " 2            4           \n",
        " 1     7         \n",
        " 2     9         \n",
        "C  1\n",
        " 1.3          2.5         \n",
        "B  2\n",
        " 0            0           \n",
        " 1            1           \n",
    );
    assert_eq!(text, expected);
    assert_eq!((summary.written, summary.skipped), (4, 0));
}

#[rstest]
fn standard_output_writes_elevations_for_3d_stores() {
    let mut store = MemoryFeatureStore::new_3d();
    store
        .append_feature(&Feature::new(
            FeatureType::Point,
            vec![Vertex::new(1.0, 2.0, 3.5)],
            Vec::new(),
        ))
        .expect("append");
    let (text, _) = encode_to_string(&EncodeOptions::default(), &mut store);
    assert_eq!(text, "P  1\n 1            2            3.5         \n");
}

#[rstest]
fn legacy_output_swaps_axes_and_writes_companion(mut mixed_store: MemoryFeatureStore) {
    let options = EncodeOptions {
        version: FormatVersion::Legacy,
        ..EncodeOptions::default()
    };
    let mut out = Vec::new();
    let mut companion = Vec::new();
    let summary = AsciiEncoder::new(&options)
        .encode(&mut mixed_store, &mut out, Some(&mut companion))
        .expect("encode");
    let expected = concat!(
        "P  1\n",
        " 5            5           \n",
        "L  2\n",
        " 0            0           \n",
        " 4            2           \n",
        "A  2\n",
        " 0            0           \n",
        " 1            1           \n",
    );
    assert_eq!(String::from_utf8(out).expect("utf-8"), expected);
    assert_eq!(
        String::from_utf8(companion).expect("utf-8"),
        "P 5 5 42\nL 1 2 7\n"
    );
    assert_eq!(summary.written, 3);
    assert_eq!(summary.skipped, 1, "centroid leaves the main stream");
    assert_eq!(summary.companion, 2);
}

#[rstest]
fn legacy_centroids_with_categories_go_to_the_companion() {
    let mut store = MemoryFeatureStore::with_features([feature(
        FeatureType::Centroid,
        &[(3.0, 4.0)],
        &[(1, 8)],
    )]);
    let options = EncodeOptions {
        version: FormatVersion::Legacy,
        ..EncodeOptions::default()
    };
    let mut out = Vec::new();
    let mut companion = Vec::new();
    AsciiEncoder::new(&options)
        .encode(&mut store, &mut out, Some(&mut companion))
        .expect("encode");
    assert!(out.is_empty());
    assert_eq!(companion, b"A 3 4 8\n");
}

#[rstest]
fn point_mode_writes_point_like_features_only(mut mixed_store: MemoryFeatureStore) {
    let options = EncodeOptions {
        precision: 1,
        ..point_options()
    };
    let (text, summary) = encode_to_string(&options, &mut mixed_store);
    assert_eq!(text, "5|5|42\n1.3|2.5\n");
    assert_eq!((summary.written, summary.skipped), (2, 2));
}

#[rstest]
fn point_mode_warns_about_extra_categories() {
    let mut store = MemoryFeatureStore::with_features([feature(
        FeatureType::Point,
        &[(1.0, 1.0)],
        &[(1, 3), (2, 4), (1, 5)],
    )]);
    let (text, summary) = encode_to_string(&point_options(), &mut store);
    assert_eq!(text, "1|1|3\n");
    assert_eq!(
        summary.warnings,
        vec![Warning::ExtraCategories {
            exported: 3,
            count: 2,
        }]
    );
}

#[rstest]
#[case(Region::new(0.0, 0.0, 10.0, 10.0), "5|5\n10|0\n")]
#[case(Region::new(0.0, 0.0, 5.0, 5.0), "5|5\n")]
#[case(Region::new(6.0, -1.0, 12.0, 1.0), "10|0\n")]
fn point_mode_clips_against_the_region(#[case] region: Region, #[case] expected: &str) {
    let mut store = MemoryFeatureStore::with_features([
        feature(FeatureType::Point, &[(5.0, 5.0)], &[]),
        feature(FeatureType::Point, &[(10.0, 0.0)], &[]),
        feature(FeatureType::Point, &[(-1.0, 5.0)], &[]),
    ]);
    let options = EncodeOptions {
        region: Some(region),
        ..point_options()
    };
    let (text, _) = encode_to_string(&options, &mut store);
    assert_eq!(text, expected);
}

#[rstest]
fn point_mode_clips_elevation_in_3d() {
    let mut store = MemoryFeatureStore::new_3d();
    for z in [1.0, 50.0] {
        store
            .append_feature(&Feature::new(
                FeatureType::Point,
                vec![Vertex::new(1.0, 1.0, z)],
                Vec::new(),
            ))
            .expect("append");
    }
    let options = EncodeOptions {
        region: Some(Region::new(0.0, 0.0, 2.0, 2.0).with_depth(0.0, 10.0)),
        separator: ",".into(),
        ..point_options()
    };
    let (text, summary) = encode_to_string(&options, &mut store);
    assert_eq!(text, "1,1,1\n");
    assert_eq!(summary.skipped, 1);
}

#[rstest]
fn unknown_types_use_the_fallback_tag_and_warn() {
    let mut store = MemoryFeatureStore::with_features([feature(
        FeatureType::Unknown,
        &[(1.0, 1.0)],
        &[],
    )]);
    let (text, summary) = encode_to_string(&EncodeOptions::default(), &mut store);
    assert!(text.starts_with("X  1\n"));
    assert_eq!(
        summary.warnings,
        vec![Warning::UnknownFeatureType {
            kind: FeatureType::Unknown,
        }]
    );
}

#[rstest]
fn deleted_features_are_not_encoded(mut mixed_store: MemoryFeatureStore) {
    assert!(mixed_store.delete(0));
    let (text, summary) = encode_to_string(&point_options(), &mut mixed_store);
    assert_eq!(text, "1.3|2.5\n");
    assert_eq!(summary.written, 1);
}

#[rstest]
fn document_starts_with_the_header_block() {
    let mut store = MemoryFeatureStore::new();
    *store.header_mut() = HeaderMetadata {
        map_name: "Wells".into(),
        ..HeaderMetadata::default()
    };
    let options = EncodeOptions::default();
    let mut out = Vec::new();
    AsciiEncoder::new(&options)
        .encode_document(&mut store, &mut out, None)
        .expect("encode");
    let text = String::from_utf8(out).expect("utf-8");
    assert!(text.contains("MAP NAME:     Wells\n"));
    assert!(text.ends_with("MAP THRESH:   0.000000\nVERTI:\n"));
}

fn attribute_fixture() -> (MemoryFeatureStore, MemoryAttributeDriver) {
    let mut store = MemoryFeatureStore::with_features([
        feature(FeatureType::Point, &[(1.0, 1.0)], &[(1, 1)]),
        feature(FeatureType::Point, &[(2.0, 2.0)], &[(1, 2)]),
        feature(FeatureType::Point, &[(3.0, 3.0)], &[(1, 3)]),
        feature(FeatureType::Point, &[(4.0, 4.0)], &[]),
    ]);
    store.bind_layer(FieldBinding {
        layer: 1,
        table: "sites".into(),
        key_column: "cat".into(),
        database: "sites.db".into(),
        driver: "memory".into(),
    });
    let table = MemoryTable::new([("name", ColumnType::Text), ("area", ColumnType::Double)])
        .with_row(
            1,
            vec![ColumnValue::Text("mill".into()), ColumnValue::Double(2.5)],
        )
        .with_row(2, vec![ColumnValue::Text("farm".into()), ColumnValue::Null])
        .with_filter("area IS NULL", vec![2]);
    (store, MemoryAttributeDriver::new([("sites", table)]))
}

#[rstest]
fn filter_clause_limits_the_output() {
    let (mut store, driver) = attribute_fixture();
    let options = EncodeOptions {
        filter: Some("area IS NULL".into()),
        ..point_options()
    };
    let mut out = Vec::new();
    let summary = AsciiEncoder::new(&options)
        .with_attribute_driver(&driver)
        .encode(&mut store, &mut out, None)
        .expect("encode");
    assert_eq!(out, b"2|2|2\n");
    assert_eq!(summary.skipped, 3);
}

#[rstest]
fn columns_are_appended_and_the_connection_released() {
    let (mut store, driver) = attribute_fixture();
    let ledger = driver.ledger();
    let options = EncodeOptions {
        columns: vec!["name".into(), "area".into()],
        ..point_options()
    };
    let mut out = Vec::new();
    AsciiEncoder::new(&options)
        .with_attribute_driver(&driver)
        .encode(&mut store, &mut out, None)
        .expect("encode");
    assert_eq!(out, b"1|1|1|mill|2.5\n2|2|2|farm|\n");
    assert_eq!((ledger.opened(), ledger.closed()), (1, 1));
}

#[rstest]
fn missing_binding_aborts_before_writing() {
    let mut store = MemoryFeatureStore::with_features([feature(FeatureType::Point, &[(1.0, 1.0)], &[(1, 1)])]);
    let options = EncodeOptions {
        filter: Some("cat > 0".into()),
        ..point_options()
    };
    let mut out = Vec::new();
    let error = AsciiEncoder::new(&options)
        .encode(&mut store, &mut out, None)
        .expect_err("no binding for layer 1");
    assert!(matches!(error, EncodeError::MissingFieldBinding { layer: 1 }));
    assert!(out.is_empty());
}

/// Store whose cursor fails after the first feature.
struct FailingStore {
    inner: MemoryFeatureStore,
    reads: usize,
}

impl FeatureStore for FailingStore {
    fn append_feature(&mut self, feature: &Feature) -> Result<(), FeatureStoreError> {
        self.inner.append_feature(feature)
    }

    fn rewind(&mut self) -> Result<(), FeatureStoreError> {
        self.reads = 0;
        self.inner.rewind()
    }

    fn read_next(&mut self) -> Result<Option<Feature>, FeatureStoreError> {
        self.reads += 1;
        if self.reads > 1 {
            return Err(FeatureStoreError::Read {
                position: 1,
                source: Box::new(io::Error::other("disk went away")),
            });
        }
        self.inner.read_next()
    }

    fn field_binding(&self, layer: u32) -> Option<FieldBinding> {
        self.inner.field_binding(layer)
    }

    fn header(&self) -> &HeaderMetadata {
        self.inner.header()
    }

    fn header_mut(&mut self) -> &mut HeaderMetadata {
        self.inner.header_mut()
    }

    fn is_3d(&self) -> bool {
        self.inner.is_3d()
    }
}

#[rstest]
fn store_errors_abort_and_release_the_connection() {
    let (inner, driver) = attribute_fixture();
    let ledger = driver.ledger();
    let mut store = FailingStore { inner, reads: 0 };
    let options = EncodeOptions {
        columns: vec!["name".into()],
        ..point_options()
    };
    let mut out = Vec::new();
    let error = AsciiEncoder::new(&options)
        .with_attribute_driver(&driver)
        .encode(&mut store, &mut out, None)
        .expect_err("cursor failure");
    assert!(matches!(error, EncodeError::Store(FeatureStoreError::Read { .. })));
    assert_eq!((ledger.opened(), ledger.closed()), (1, 1));
}

fn encode_through_trait_objects(
    store: &mut dyn FeatureStore,
    output: &mut dyn Write,
    companion: &mut dyn Write,
) -> Result<EncodeSummary, EncodeError> {
    let options = EncodeOptions {
        version: FormatVersion::Legacy,
        ..EncodeOptions::default()
    };
    AsciiEncoder::new(&options).encode_document(store, output, Some(companion))
}

#[rstest]
fn companion_writers_borrowed_as_trait_objects_are_flushed(
    mut mixed_store: MemoryFeatureStore,
) {
    let mut out = Vec::new();
    let mut companion = Vec::new();
    {
        let mut buffered = io::BufWriter::new(&mut companion);
        let summary = encode_through_trait_objects(&mut mixed_store, &mut out, &mut buffered)
            .expect("encode");
        assert_eq!(summary.companion, 2);
        assert_eq!(buffered.get_ref().as_slice(), b"P 5 5 42\nL 1 2 7\n");
    }
    assert!(String::from_utf8(out).expect("utf-8").contains("VERTI:\n"));
}
