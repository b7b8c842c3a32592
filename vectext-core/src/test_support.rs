//! Test-only attribute driver backed by in-memory tables.
//!
//! Filter clauses cannot be evaluated without a SQL engine, so each table maps
//! clause strings to the keys they select. Unregistered clauses fail the
//! query like a syntax error would.

use std::{
    cell::Cell,
    collections::{BTreeMap, HashMap},
    io,
    rc::Rc,
};

use crate::{
    AttributeConnection, AttributeDriver, AttributeError, ColumnType, ColumnValue, FieldBinding,
};

/// In-memory attribute table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<(String, ColumnType)>,
    rows: BTreeMap<i64, Vec<ColumnValue>>,
    filters: HashMap<String, Vec<i64>>,
}

impl MemoryTable {
    /// Create a table with the given columns, excluding the key column.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
            ..Self::default()
        }
    }

    /// Add a row keyed by `key`. Values follow the column order.
    #[must_use]
    pub fn with_row(mut self, key: i64, values: Vec<ColumnValue>) -> Self {
        self.rows.insert(key, values);
        self
    }

    /// Register the keys selected by a filter clause.
    #[must_use]
    pub fn with_filter(mut self, clause: &str, keys: Vec<i64>) -> Self {
        self.filters.insert(clause.to_owned(), keys);
        self
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|(name, _)| name == column)
    }
}

/// Counts connections opened and closed through a [`MemoryAttributeDriver`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionLedger {
    opened: Rc<Cell<usize>>,
    closed: Rc<Cell<usize>>,
}

impl ConnectionLedger {
    /// Connections opened so far.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    /// Connections dropped so far.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.get()
    }
}

/// Attribute driver serving [`MemoryTable`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttributeDriver {
    tables: Rc<HashMap<String, MemoryTable>>,
    ledger: ConnectionLedger,
    refuse_open: bool,
}

impl MemoryAttributeDriver {
    /// Create a driver serving `tables`.
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = (S, MemoryTable)>,
        S: Into<String>,
    {
        Self {
            tables: Rc::new(
                tables
                    .into_iter()
                    .map(|(name, table)| (name.into(), table))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Create a driver whose databases cannot be opened.
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            refuse_open: true,
            ..Self::default()
        }
    }

    /// Shared open/close counters.
    #[must_use]
    pub fn ledger(&self) -> ConnectionLedger {
        self.ledger.clone()
    }
}

impl AttributeDriver for MemoryAttributeDriver {
    fn open(&self, binding: &FieldBinding) -> Result<Box<dyn AttributeConnection>, AttributeError> {
        if self.refuse_open {
            return Err(AttributeError::Open {
                database: binding.database.clone(),
                driver: binding.driver.clone(),
                source: Box::new(io::Error::new(io::ErrorKind::NotFound, "no such database")),
            });
        }
        self.ledger.opened.set(self.ledger.opened.get() + 1);
        Ok(Box::new(MemoryConnection {
            tables: Rc::clone(&self.tables),
            ledger: self.ledger.clone(),
        }))
    }
}

struct MemoryConnection {
    tables: Rc<HashMap<String, MemoryTable>>,
    ledger: ConnectionLedger,
}

impl MemoryConnection {
    fn table(&self, table: &str) -> Result<&MemoryTable, AttributeError> {
        self.tables.get(table).ok_or_else(|| AttributeError::Query {
            statement: format!("SELECT * FROM {table}"),
            source: Box::new(io::Error::new(io::ErrorKind::NotFound, "no such table")),
        })
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.ledger.closed.set(self.ledger.closed.get() + 1);
    }
}

impl AttributeConnection for MemoryConnection {
    fn select_keys(
        &mut self,
        table: &str,
        key: &str,
        filter: Option<&str>,
    ) -> Result<Vec<i64>, AttributeError> {
        let source = self.table(table)?;
        let Some(clause) = filter else {
            return Ok(source.rows.keys().copied().collect());
        };
        let mut keys = source
            .filters
            .get(clause)
            .cloned()
            .ok_or_else(|| AttributeError::Query {
                statement: format!("SELECT {key} FROM {table} WHERE {clause}"),
                source: Box::new(io::Error::new(io::ErrorKind::InvalidInput, "syntax error")),
            })?;
        keys.sort_unstable();
        Ok(keys)
    }

    fn column_type(&mut self, table: &str, column: &str) -> Result<ColumnType, AttributeError> {
        let source = self.table(table)?;
        Ok(source
            .column_index(column)
            .map_or(ColumnType::NotFound, |index| source.columns[index].1.clone()))
    }

    fn select_value(
        &mut self,
        table: &str,
        _key: &str,
        id: u32,
        column: &str,
    ) -> Result<ColumnValue, AttributeError> {
        let source = self.table(table)?;
        let value = source.column_index(column).and_then(|index| {
            source
                .rows
                .get(&i64::from(id))
                .and_then(|row| row.get(index))
                .cloned()
        });
        Ok(value.unwrap_or(ColumnValue::Null))
    }
}
