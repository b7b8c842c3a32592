//! SQLite implementation of the attribute driver.

use std::io;

use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension, types::Value};
use vectext_core::{
    AttributeConnection, AttributeDriver, AttributeError, ColumnType, ColumnValue, FieldBinding,
};

/// Driver name accepted by [`SqliteAttributeDriver`].
pub const SQLITE_DRIVER: &str = "sqlite";

/// Opens the SQLite database named by a layer binding.
///
/// The binding's `database` is a filesystem path; the file is opened
/// read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteAttributeDriver;

impl AttributeDriver for SqliteAttributeDriver {
    fn open(&self, binding: &FieldBinding) -> Result<Box<dyn AttributeConnection>, AttributeError> {
        if binding.driver != SQLITE_DRIVER {
            return Err(AttributeError::UnknownDriver {
                driver: binding.driver.clone(),
            });
        }
        let connection = Connection::open_with_flags(
            &binding.database,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| AttributeError::Open {
            database: binding.database.clone(),
            driver: binding.driver.clone(),
            source: Box::new(source),
        })?;
        debug!("opened attribute database {}", binding.database);
        Ok(Box::new(SqliteAttributeConnection { connection }))
    }
}

struct SqliteAttributeConnection {
    connection: Connection,
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn query_error(statement: &str, source: rusqlite::Error) -> AttributeError {
    AttributeError::Query {
        statement: statement.to_owned(),
        source: Box::new(source),
    }
}

/// Map a declared column type onto the codec's column kinds.
///
/// Follows SQLite's affinity rules, with date and time declarations
/// recognised before the numeric fallback.
fn column_kind(declared: &str) -> ColumnType {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        ColumnType::Integer
    } else if upper.contains("DATE") || upper.contains("TIME") {
        ColumnType::DateTime
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        ColumnType::Text
    } else if upper.contains("REAL")
        || upper.contains("FLOA")
        || upper.contains("DOUB")
        || upper.contains("NUMERIC")
        || upper.contains("DECIMAL")
    {
        ColumnType::Double
    } else {
        ColumnType::Unsupported(declared.to_owned())
    }
}

impl AttributeConnection for SqliteAttributeConnection {
    fn select_keys(
        &mut self,
        table: &str,
        key: &str,
        filter: Option<&str>,
    ) -> Result<Vec<i64>, AttributeError> {
        let key = quote_identifier(key);
        let mut sql = format!("SELECT {key} FROM {}", quote_identifier(table));
        if let Some(clause) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        sql.push_str(&format!(" ORDER BY {key}"));
        let mut statement = self
            .connection
            .prepare(&sql)
            .map_err(|source| query_error(&sql, source))?;
        let keys = statement
            .query_map([], |row| row.get::<_, Option<i64>>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|source| query_error(&sql, source))?;
        Ok(keys.into_iter().flatten().collect())
    }

    fn column_type(&mut self, table: &str, column: &str) -> Result<ColumnType, AttributeError> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table));
        let mut statement = self
            .connection
            .prepare(&sql)
            .map_err(|source| query_error(&sql, source))?;
        let columns = statement
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|source| query_error(&sql, source))?;
        Ok(columns
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map_or(ColumnType::NotFound, |(_, declared)| column_kind(&declared)))
    }

    fn select_value(
        &mut self,
        table: &str,
        key: &str,
        id: u32,
        column: &str,
    ) -> Result<ColumnValue, AttributeError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            quote_identifier(column),
            quote_identifier(table),
            quote_identifier(key)
        );
        let value = self
            .connection
            .query_row(&sql, [id], |row| row.get::<_, Value>(0))
            .optional()
            .map_err(|source| query_error(&sql, source))?;
        match value {
            None | Some(Value::Null) => Ok(ColumnValue::Null),
            Some(Value::Integer(value)) => Ok(ColumnValue::Integer(value)),
            Some(Value::Real(value)) => Ok(ColumnValue::Double(value)),
            Some(Value::Text(value)) => Ok(ColumnValue::Text(value)),
            Some(Value::Blob(_)) => Err(AttributeError::Query {
                statement: sql,
                source: Box::new(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("column {column} holds a blob"),
                )),
            }),
        }
    }
}
