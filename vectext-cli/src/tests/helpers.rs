//! Test helpers for building ASCII inputs, maps and attribute databases.

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use tempfile::TempDir;
use vectext_core::{CategoryTag, Feature, FeatureStore, FeatureType, SqliteFeatureStore, Vertex};

/// Header block, sentinel and two categorised records.
pub(super) const SITES_DOCUMENT: &str = "\
ORGANIZATION: survey office
MAP NAME:     sites
VERTI:
P  1 1
 5.0 5.0
 1 42
L  2 1
 0 0
 3 4
 1 7
";

/// Temporary workspace addressed with UTF-8 paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write file");
}

pub(super) fn read_utf8(path: &Utf8Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}

/// Create a map holding one point (category 42) and one line (category 7).
pub(super) fn sites_map(path: &Utf8Path) {
    let mut store = SqliteFeatureStore::create(path.as_std_path(), false).expect("create map");
    store
        .append_feature(&Feature::new(
            FeatureType::Point,
            vec![Vertex::planar(5.0, 5.0)],
            vec![CategoryTag::new(1, 42)],
        ))
        .expect("append point");
    store
        .append_feature(&Feature::new(
            FeatureType::Line,
            vec![Vertex::planar(0.0, 0.0), Vertex::planar(3.0, 4.0)],
            vec![CategoryTag::new(1, 7)],
        ))
        .expect("append line");
}

/// Create an attribute table `sites(cat, name)` keyed by category.
pub(super) fn sites_table(path: &Utf8Path) {
    let connection = Connection::open(path.as_std_path()).expect("open attribute database");
    connection
        .execute_batch(
            "CREATE TABLE sites (cat INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO sites VALUES (7, 'track'), (42, 'well');",
        )
        .expect("create attribute table");
}

pub(super) fn read_all(path: &Utf8Path) -> Vec<Feature> {
    let mut store = SqliteFeatureStore::open(path.as_std_path()).expect("open map");
    store.rewind().expect("rewind");
    let mut features = Vec::new();
    while let Some(feature) = store.read_next().expect("read feature") {
        features.push(feature);
    }
    features
}
