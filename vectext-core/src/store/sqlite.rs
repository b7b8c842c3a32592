//! SQLite-backed feature store.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use thiserror::Error;

use crate::{CategoryTag, Feature, FeatureType, HeaderMetadata, Vertex};

use super::{FeatureStore, FeatureStoreError, FieldBinding};

/// Error raised when opening or using a SQLite map.
#[derive(Debug, Error)]
pub enum SqliteFeatureStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite map at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the map tables failed.
    #[error("failed to execute schema step '{step}'")]
    Schema {
        /// Schema step that failed.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database holds no map description row.
    #[error("{path} is not a vectext map")]
    NotAMap {
        /// Location of the SQLite database on disk.
        path: PathBuf,
    },
    /// The stored header was not valid JSON.
    #[error("failed to decode map header: {source}")]
    InvalidHeader {
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Vertices could not be encoded for storage.
    #[error("failed to encode vertices: {source}")]
    EncodeVertices {
        /// Encoder failure from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Stored vertices could not be decoded.
    #[error("failed to decode vertices of feature {id}: {source}")]
    DecodeVertices {
        /// Row id of the feature.
        id: i64,
        /// Decoder failure from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Generic SQLite error when reading or writing rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Map persisted in a SQLite file.
///
/// Header metadata and layer bindings are cached in memory; call
/// [`SqliteFeatureStore::save_header`] to persist header edits.
pub struct SqliteFeatureStore {
    connection: Connection,
    header: HeaderMetadata,
    with_z: bool,
    bindings: HashMap<u32, FieldBinding>,
    last_id: i64,
    position: usize,
}

impl fmt::Debug for SqliteFeatureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteFeatureStore")
            .field("with_z", &self.with_z)
            .field("layers", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl SqliteFeatureStore {
    /// Open the map at `path`, creating the file and tables when missing.
    ///
    /// `with_z` only applies to new maps; existing maps keep their dimension.
    pub fn create<P: AsRef<Path>>(path: P, with_z: bool) -> Result<Self, SqliteFeatureStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteFeatureStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        initialise_schema(&connection)?;
        let header = serde_json::to_string(&HeaderMetadata::default())
            .map_err(|source| SqliteFeatureStoreError::InvalidHeader { source })?;
        connection.execute(
            "INSERT OR IGNORE INTO map_info (id, with_z, header) VALUES (1, ?1, ?2)",
            params![with_z, header],
        )?;
        Self::load(connection, path)
    }

    /// Open an existing map at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteFeatureStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE).map_err(
                |source| SqliteFeatureStoreError::OpenDatabase {
                    path: path.to_path_buf(),
                    source,
                },
            )?;
        initialise_schema(&connection)?;
        Self::load(connection, path)
    }

    fn load(connection: Connection, path: &Path) -> Result<Self, SqliteFeatureStoreError> {
        let info: Option<(bool, String)> = connection
            .query_row("SELECT with_z, header FROM map_info WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;
        let Some((with_z, header_json)) = info else {
            return Err(SqliteFeatureStoreError::NotAMap {
                path: path.to_path_buf(),
            });
        };
        let header = serde_json::from_str(&header_json)
            .map_err(|source| SqliteFeatureStoreError::InvalidHeader { source })?;
        let bindings = load_bindings(&connection)?;
        Ok(Self {
            connection,
            header,
            with_z,
            bindings,
            last_id: 0,
            position: 0,
        })
    }

    /// Persist the in-memory header metadata.
    pub fn save_header(&self) -> Result<(), SqliteFeatureStoreError> {
        let header = serde_json::to_string(&self.header)
            .map_err(|source| SqliteFeatureStoreError::InvalidHeader { source })?;
        self.connection
            .execute("UPDATE map_info SET header = ?1 WHERE id = 1", [header])?;
        Ok(())
    }

    /// Register (or replace) the attribute table of a layer.
    pub fn bind_layer(&mut self, binding: FieldBinding) -> Result<(), SqliteFeatureStoreError> {
        self.connection.execute(
            "INSERT OR REPLACE INTO layer_bindings (layer, table_name, key_column, database, driver)
                VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                binding.layer,
                binding.table,
                binding.key_column,
                binding.database,
                binding.driver
            ],
        )?;
        self.bindings.insert(binding.layer, binding);
        Ok(())
    }

    /// Mark a feature as deleted. Returns `false` when the row does not exist.
    pub fn delete_feature(&self, id: i64) -> Result<bool, SqliteFeatureStoreError> {
        let changed = self
            .connection
            .execute("UPDATE features SET alive = 0 WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    fn insert(&mut self, feature: &Feature) -> Result<(), SqliteFeatureStoreError> {
        let vertices = bincode::serialize(&feature.vertices)
            .map_err(|source| SqliteFeatureStoreError::EncodeVertices { source })?;
        let transaction = self.connection.transaction()?;
        transaction.execute(
            "INSERT INTO features (kind, vertices) VALUES (?1, ?2)",
            params![feature.kind.to_string(), vertices],
        )?;
        let id = transaction.last_insert_rowid();
        {
            let mut insert_category = transaction.prepare_cached(
                "INSERT INTO feature_categories (feature_id, position, field, category)
                    VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, tag) in (0_i64..).zip(&feature.categories) {
                insert_category.execute(params![id, position, tag.field, tag.category])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    fn next_row(&mut self) -> Result<Option<Feature>, SqliteFeatureStoreError> {
        let row: Option<(i64, String, Vec<u8>)> = self
            .connection
            .prepare_cached(
                "SELECT id, kind, vertices FROM features
                    WHERE alive = 1 AND id > ?1 ORDER BY id LIMIT 1",
            )?
            .query_row([self.last_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;
        let Some((id, kind, blob)) = row else {
            return Ok(None);
        };
        let vertices: Vec<Vertex> = bincode::deserialize(&blob)
            .map_err(|source| SqliteFeatureStoreError::DecodeVertices { id, source })?;
        let mut statement = self.connection.prepare_cached(
            "SELECT field, category FROM feature_categories WHERE feature_id = ?1 ORDER BY position",
        )?;
        let categories = statement
            .query_map([id], |row| Ok(CategoryTag::new(row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        self.last_id = id;
        Ok(Some(Feature::new(parse_kind(&kind), vertices, categories)))
    }
}

impl FeatureStore for SqliteFeatureStore {
    fn append_feature(&mut self, feature: &Feature) -> Result<(), FeatureStoreError> {
        self.insert(feature)
            .map_err(|source| FeatureStoreError::Append {
                kind: feature.kind,
                source: Box::new(source),
            })
    }

    fn rewind(&mut self) -> Result<(), FeatureStoreError> {
        self.last_id = 0;
        self.position = 0;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Feature>, FeatureStoreError> {
        let feature = self
            .next_row()
            .map_err(|source| FeatureStoreError::Read {
                position: self.position,
                source: Box::new(source),
            })?;
        if feature.is_some() {
            self.position += 1;
        }
        Ok(feature)
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

fn parse_kind(name: &str) -> FeatureType {
    match name {
        "boundary" => FeatureType::Boundary,
        "centroid" => FeatureType::Centroid,
        "line" => FeatureType::Line,
        "point" => FeatureType::Point,
        "face" => FeatureType::Face,
        "kernel" => FeatureType::Kernel,
        "dead" => FeatureType::Dead,
        other => {
            debug!("stored feature kind {other:?} has no text tag");
            FeatureType::Unknown
        }
    }
}

fn load_bindings(
    connection: &Connection,
) -> Result<HashMap<u32, FieldBinding>, SqliteFeatureStoreError> {
    let mut statement = connection.prepare(
        "SELECT layer, table_name, key_column, database, driver FROM layer_bindings",
    )?;
    let bindings = statement
        .query_map([], |row| {
            Ok(FieldBinding {
                layer: row.get(0)?,
                table: row.get(1)?,
                key_column: row.get(2)?,
                database: row.get(3)?,
                driver: row.get(4)?,
            })
        })?
        .map(|binding| binding.map(|binding| (binding.layer, binding)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(bindings)
}

fn initialise_schema(connection: &Connection) -> Result<(), SqliteFeatureStoreError> {
    run_schema_step(
        connection,
        "create map_info",
        "CREATE TABLE IF NOT EXISTS map_info (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            with_z INTEGER NOT NULL,
            header TEXT NOT NULL
        )",
    )?;
    run_schema_step(
        connection,
        "create features",
        "CREATE TABLE IF NOT EXISTS features (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            vertices BLOB NOT NULL,
            alive INTEGER NOT NULL DEFAULT 1
        )",
    )?;
    run_schema_step(
        connection,
        "create feature_categories",
        "CREATE TABLE IF NOT EXISTS feature_categories (
            feature_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            field INTEGER NOT NULL,
            category INTEGER NOT NULL,
            PRIMARY KEY (feature_id, position),
            FOREIGN KEY (feature_id) REFERENCES features(id) ON DELETE CASCADE
        ) WITHOUT ROWID",
    )?;
    run_schema_step(
        connection,
        "create layer_bindings",
        "CREATE TABLE IF NOT EXISTS layer_bindings (
            layer INTEGER PRIMARY KEY,
            table_name TEXT NOT NULL,
            key_column TEXT NOT NULL,
            database TEXT NOT NULL,
            driver TEXT NOT NULL
        )",
    )
}

fn run_schema_step(
    connection: &Connection,
    step: &'static str,
    sql: &str,
) -> Result<(), SqliteFeatureStoreError> {
    connection
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SqliteFeatureStoreError::Schema { step, source })
}
