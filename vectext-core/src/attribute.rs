//! Access to the relational attribute tables joined to features.
//!
//! The codec only needs a narrow slice of a database driver: select the
//! primary keys matching a filter clause, introspect a column type, and read
//! one scalar by key. Connections are released when dropped, so holding one
//! in a scope guarantees release on every exit path.

use std::error::Error as StdError;

use thiserror::Error;

use crate::FieldBinding;

/// Boxed driver-specific failure.
pub type DriverError = Box<dyn StdError + Send + Sync>;

/// Declared type of an attribute column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Double,
    /// Character data.
    Text,
    /// Dates and times.
    DateTime,
    /// Any other declared type, carrying its declaration.
    Unsupported(String),
    /// The table has no such column.
    NotFound,
}

/// Scalar read from an attribute column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL `NULL`, or no row for the requested key.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Double(f64),
    /// Text value.
    Text(String),
}

/// Errors raised by attribute drivers and connections.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The binding names a driver this build does not provide.
    #[error("unknown attribute driver <{driver}>")]
    UnknownDriver {
        /// Driver name from the layer binding.
        driver: String,
    },
    /// The database could not be opened.
    #[error("unable to open database <{database}> by driver <{driver}>")]
    Open {
        /// Database identifier from the layer binding.
        database: String,
        /// Driver name from the layer binding.
        driver: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },
    /// A statement failed.
    #[error("attribute query failed: {statement}")]
    Query {
        /// Statement (or statement template) that failed.
        statement: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },
}

/// Opens connections to attribute databases.
pub trait AttributeDriver {
    /// Open the database described by `binding`.
    fn open(&self, binding: &FieldBinding) -> Result<Box<dyn AttributeConnection>, AttributeError>;
}

/// An open attribute database. Dropping the connection closes it.
pub trait AttributeConnection {
    /// Primary keys of `table` whose rows satisfy `filter`, in ascending order.
    ///
    /// `None` selects every row.
    fn select_keys(
        &mut self,
        table: &str,
        key: &str,
        filter: Option<&str>,
    ) -> Result<Vec<i64>, AttributeError>;

    /// Declared type of `column` in `table`.
    fn column_type(&mut self, table: &str, column: &str) -> Result<ColumnType, AttributeError>;

    /// Value of `column` in the row whose `key` equals `id`.
    ///
    /// A missing row reads as [`ColumnValue::Null`].
    fn select_value(
        &mut self,
        table: &str,
        key: &str,
        id: u32,
        column: &str,
    ) -> Result<ColumnValue, AttributeError>;
}
