//! Attribute-table drivers.

mod sqlite;

pub use sqlite::{SQLITE_DRIVER, SqliteAttributeDriver};
