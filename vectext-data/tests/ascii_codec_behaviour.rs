//! Behavioural tests for the ASCII codec using rstest-bdd.

use std::{cell::RefCell, io::Cursor};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use vectext_core::{CategoryTag, FeatureType, MemoryFeatureStore, Vertex};
use vectext_data::{AsciiEncoder, AsciiReader, DecodeError, DecodeSummary, EncodeOptions, OutputMode};

/// Shared state for codec scenarios.
#[derive(Debug, Default)]
struct CodecWorld {
    input: RefCell<String>,
    store: RefCell<MemoryFeatureStore>,
    summary: RefCell<Option<DecodeSummary>>,
    error: RefCell<Option<DecodeError>>,
    output: RefCell<String>,
}

impl CodecWorld {
    fn set_input(&self, text: &str) {
        self.input.replace(text.to_owned());
    }

    fn expect_summary(&self) -> DecodeSummary {
        assert!(self.error.borrow().is_none(), "unexpected decode error");
        self.summary
            .borrow()
            .clone()
            .expect("decode should have produced a summary")
    }
}

#[fixture]
fn world() -> CodecWorld {
    CodecWorld::default()
}

#[given("ASCII input describing a two-vertex boundary")]
fn given_boundary(world: &CodecWorld) {
    world.set_input("B  2\n 0.0   0.0\n 1.0   1.0\n");
}

#[given("ASCII input describing a categorised point")]
fn given_point(world: &CodecWorld) {
    world.set_input("P  1 1\n 5.0 5.0\n 1 42\n");
}

#[given("ASCII input with an unknown feature type")]
fn given_unknown_type(world: &CodecWorld) {
    world.set_input("X 5\n");
}

#[given("ASCII input with a single-coordinate vertex")]
fn given_short_vertex(world: &CodecWorld) {
    world.set_input("P  1\n3.0\n");
}

#[given("ASCII input mixing dead and live records")]
fn given_dead_records(world: &CodecWorld) {
    world.set_input("p  1\n 9 9\nL  2\n 0 0\n 1 1\n# note\nb  2\n 0 0\n 2 2\nC  1 1\n 0.5 0.5\n 1 3\n");
}

#[when("the input is decoded into a memory store")]
fn decode_input(world: &CodecWorld) {
    let input = world.input.borrow().clone();
    let mut store = world.store.borrow_mut();
    match AsciiReader::new(Cursor::new(input)).read_features(&mut *store) {
        Ok(summary) => {
            world.summary.replace(Some(summary));
        }
        Err(error) => {
            world.error.replace(Some(error));
        }
    }
}

#[when("the store is encoded as a point list with one decimal place")]
fn encode_point_list(world: &CodecWorld) {
    let options = EncodeOptions {
        mode: OutputMode::Point,
        precision: 1,
        ..EncodeOptions::default()
    };
    let mut out = Vec::new();
    AsciiEncoder::new(&options)
        .encode(&mut *world.store.borrow_mut(), &mut out, None)
        .expect("encode point list");
    world
        .output
        .replace(String::from_utf8(out).expect("utf-8 output"));
}

#[then("one boundary with two vertices and no categories is committed")]
fn then_boundary(world: &CodecWorld) {
    assert_eq!(world.expect_summary().committed, 1);
    let store = world.store.borrow();
    let feature = store.features().next().expect("committed feature");
    assert_eq!(feature.kind, FeatureType::Boundary);
    assert_eq!(
        feature.vertices,
        vec![Vertex::planar(0.0, 0.0), Vertex::planar(1.0, 1.0)]
    );
    assert!(feature.categories.is_empty());
}

#[then("the point list holds the point and its category")]
fn then_point_list(world: &CodecWorld) {
    assert_eq!(world.output.borrow().as_str(), "5|5|42\n");
}

#[then("decoding fails with an unknown feature type error")]
fn then_unknown_type(world: &CodecWorld) {
    let error = world.error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(DecodeError::UnknownFeatureType { tag: 'X', .. })
    ));
}

#[then("decoding fails with a malformed vertex error")]
fn then_malformed_vertex(world: &CodecWorld) {
    let error = world.error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(DecodeError::MalformedVertex { line_number: 2, .. })
    ));
}

#[then("only the live records are committed")]
fn then_live_records(world: &CodecWorld) {
    let summary = world.expect_summary();
    assert_eq!((summary.committed, summary.dead), (2, 2));
    let store = world.store.borrow();
    let kinds: Vec<_> = store.features().map(|feature| feature.kind).collect();
    assert_eq!(kinds, vec![FeatureType::Line, FeatureType::Centroid]);
    let centroid = store.features().nth(1).expect("centroid");
    assert_eq!(centroid.categories, vec![CategoryTag::new(1, 3)]);
}

#[scenario(path = "tests/features/ascii_codec.feature", index = 0)]
fn boundary_without_categories(world: CodecWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ascii_codec.feature", index = 1)]
fn point_list_export(world: CodecWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ascii_codec.feature", index = 2)]
fn unknown_type_aborts(world: CodecWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ascii_codec.feature", index = 3)]
fn short_vertex_aborts(world: CodecWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ascii_codec.feature", index = 4)]
fn dead_records_discarded(world: CodecWorld) {
    let _ = world;
}
