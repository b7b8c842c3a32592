//! Attribute-driven feature selection and column lookup for the encoder.

use std::collections::HashMap;

use log::debug;
use vectext_core::{
    AttributeConnection, AttributeDriver, ColumnType, ColumnValue, Feature, FeatureStore,
    FieldBinding, SelectionSet,
};

use super::{error::EncodeError, format::format_decimal};

/// Connection kept open while columns are exported.
struct ColumnLookup {
    connection: Box<dyn AttributeConnection>,
    binding: FieldBinding,
    columns: Vec<String>,
    types: HashMap<String, ColumnType>,
}

impl ColumnLookup {
    fn column_type(&mut self, column: &str) -> Result<ColumnType, EncodeError> {
        if let Some(kind) = self.types.get(column) {
            return Ok(kind.clone());
        }
        let kind = self
            .connection
            .column_type(&self.binding.table, column)
            .map_err(|source| self.select_error(column, source))?;
        self.types.insert(column.to_owned(), kind.clone());
        Ok(kind)
    }

    fn select_error(&self, column: &str, source: vectext_core::AttributeError) -> EncodeError {
        EncodeError::SelectValue {
            table: self.binding.table.clone(),
            key_column: self.binding.key_column.clone(),
            column: column.to_owned(),
            source,
        }
    }

    fn append(
        &mut self,
        line: &mut String,
        id: u32,
        separator: &str,
        precision: usize,
    ) -> Result<(), EncodeError> {
        for index in 0..self.columns.len() {
            let column = self.columns[index].clone();
            let kind = self.column_type(&column)?;
            match kind {
                ColumnType::NotFound => {
                    return Err(EncodeError::ColumnNotFound {
                        column,
                        table: self.binding.table.clone(),
                    });
                }
                ColumnType::Unsupported(declared) => {
                    return Err(EncodeError::UnsupportedColumnType { column, declared });
                }
                ColumnType::Integer | ColumnType::Double | ColumnType::Text | ColumnType::DateTime => {}
            }
            let value = self
                .connection
                .select_value(&self.binding.table, &self.binding.key_column, id, &column)
                .map_err(|source| self.select_error(&column, source))?;
            line.push_str(separator);
            if kind == ColumnType::DateTime {
                continue;
            }
            match value {
                ColumnValue::Null => {}
                ColumnValue::Integer(value) => line.push_str(&value.to_string()),
                ColumnValue::Double(value) => line.push_str(&format_decimal(value, precision)),
                ColumnValue::Text(value) => line.push_str(&value),
            }
        }
        Ok(())
    }
}

/// Resolved category filter and optional column lookup for one encode pass.
///
/// With neither a filter clause nor export columns the selector is inactive
/// and accepts every feature. Otherwise the ids selected from the layer's
/// attribute table form the filter, even when the clause selects nothing.
/// The attribute connection is held only while columns must be fetched and
/// is released when the selector is dropped.
pub struct CategorySelector {
    selection: Option<SelectionSet>,
    lookup: Option<ColumnLookup>,
}

impl std::fmt::Debug for CategorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorySelector")
            .field("selection", &self.selection)
            .field("columns", &self.lookup.as_ref().map(|lookup| &lookup.columns))
            .finish()
    }
}

impl CategorySelector {
    /// Selector that accepts every feature and exports no columns.
    #[must_use]
    pub const fn inactive() -> Self {
        Self {
            selection: None,
            lookup: None,
        }
    }

    /// Resolve `filter` and `columns` against the attribute table of `layer`.
    pub fn resolve<S>(
        store: &S,
        layer: u32,
        filter: Option<&str>,
        columns: &[String],
        driver: Option<&dyn AttributeDriver>,
    ) -> Result<Self, EncodeError>
    where
        S: FeatureStore + ?Sized,
    {
        if filter.is_none() && columns.is_empty() {
            return Ok(Self::inactive());
        }
        let binding = store
            .field_binding(layer)
            .ok_or(EncodeError::MissingFieldBinding { layer })?;
        let driver = driver.ok_or(EncodeError::NoAttributeDriver { layer })?;
        let mut connection = driver.open(&binding).map_err(EncodeError::OpenDatabase)?;
        let keys = connection
            .select_keys(&binding.table, &binding.key_column, filter)
            .map_err(|source| EncodeError::SelectKeys {
                table: binding.table.clone(),
                source,
            })?;
        let selection: SelectionSet = keys
            .into_iter()
            .filter_map(|key| u32::try_from(key).ok())
            .collect();
        debug!(
            "{} categories selected from table <{}>",
            selection.len(),
            binding.table
        );
        let lookup = if columns.is_empty() {
            None
        } else {
            Some(ColumnLookup {
                connection,
                binding,
                columns: columns.to_vec(),
                types: HashMap::new(),
            })
        };
        Ok(Self {
            selection: Some(selection),
            lookup,
        })
    }

    /// Whether a category filter applies.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.selection.is_some()
    }

    /// Selected ids, when a filter applies.
    #[must_use]
    pub const fn selection(&self) -> Option<&SelectionSet> {
        self.selection.as_ref()
    }

    /// Whether `feature` passes the filter.
    #[must_use]
    pub fn accepts(&self, feature: &Feature) -> bool {
        self.selection
            .as_ref()
            .is_none_or(|selection| selection.matches(feature))
    }

    /// Whether attribute columns are exported.
    #[must_use]
    pub const fn exports_columns(&self) -> bool {
        self.lookup.is_some()
    }

    /// Append one `separator`-prefixed field per export column for `id`.
    pub(crate) fn append_columns(
        &mut self,
        line: &mut String,
        id: u32,
        separator: &str,
        precision: usize,
    ) -> Result<(), EncodeError> {
        match self.lookup.as_mut() {
            Some(lookup) => lookup.append(line, id, separator, precision),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use vectext_core::{
        CategoryTag, FeatureType, MemoryFeatureStore,
        test_support::{MemoryAttributeDriver, MemoryTable},
    };

    fn binding() -> FieldBinding {
        FieldBinding {
            layer: 1,
            table: "wells".into(),
            key_column: "cat".into(),
            database: "wells.db".into(),
            driver: "memory".into(),
        }
    }

    #[fixture]
    fn store() -> MemoryFeatureStore {
        let mut store = MemoryFeatureStore::new();
        store.bind_layer(binding());
        store
    }

    #[fixture]
    fn driver() -> MemoryAttributeDriver {
        let table = MemoryTable::new([
            ("name", ColumnType::Text),
            ("depth", ColumnType::Double),
            ("drilled", ColumnType::DateTime),
            ("shape", ColumnType::Unsupported("BLOB".into())),
        ])
        .with_row(
            3,
            vec![
                ColumnValue::Text("North".into()),
                ColumnValue::Double(12.50),
                ColumnValue::Text("2001-01-01".into()),
                ColumnValue::Null,
            ],
        )
        .with_row(
            5,
            vec![
                ColumnValue::Null,
                ColumnValue::Double(7.0),
                ColumnValue::Null,
                ColumnValue::Null,
            ],
        )
        .with_filter("depth > 10", vec![3])
        .with_filter("depth > 100", Vec::new());
        MemoryAttributeDriver::new([("wells", table)])
    }

    fn point(category: u32) -> Feature {
        Feature::new(
            FeatureType::Point,
            Vec::new(),
            vec![CategoryTag::new(1, category)],
        )
    }

    #[rstest]
    fn no_filter_and_no_columns_stays_inactive(store: MemoryFeatureStore) {
        let selector = CategorySelector::resolve(&store, 1, None, &[], None).expect("resolve");
        assert!(!selector.is_active());
        assert!(selector.accepts(&point(99)));
    }

    #[rstest]
    fn filter_selects_matching_categories(store: MemoryFeatureStore, driver: MemoryAttributeDriver) {
        let ledger = driver.ledger();
        let selector =
            CategorySelector::resolve(&store, 1, Some("depth > 10"), &[], Some(&driver))
                .expect("resolve");
        assert!(selector.accepts(&point(3)));
        assert!(!selector.accepts(&point(5)));
        assert_eq!(ledger.closed(), 1, "connection released without columns");
    }

    #[rstest]
    fn empty_selection_is_still_a_filter(store: MemoryFeatureStore, driver: MemoryAttributeDriver) {
        let selector =
            CategorySelector::resolve(&store, 1, Some("depth > 100"), &[], Some(&driver))
                .expect("resolve");
        assert!(selector.is_active());
        assert_eq!(selector.selection().map(SelectionSet::len), Some(0));
        assert!(!selector.accepts(&point(3)));
    }

    #[rstest]
    fn columns_keep_the_connection_until_drop(
        store: MemoryFeatureStore,
        driver: MemoryAttributeDriver,
    ) {
        let ledger = driver.ledger();
        let columns = vec!["name".to_owned(), "depth".to_owned(), "drilled".to_owned()];
        let mut selector =
            CategorySelector::resolve(&store, 1, None, &columns, Some(&driver)).expect("resolve");
        assert_eq!(ledger.closed(), 0);
        assert!(selector.accepts(&point(5)));

        let mut line = String::from("1|2|3");
        selector.append_columns(&mut line, 3, "|", 8).expect("columns");
        assert_eq!(line, "1|2|3|North|12.5|");

        let mut line = String::from("x");
        selector.append_columns(&mut line, 5, ",", 8).expect("columns");
        assert_eq!(line, "x,,7,");

        drop(selector);
        assert_eq!((ledger.opened(), ledger.closed()), (1, 1));
    }

    #[rstest]
    #[case("colour", "not found in table <wells>")]
    #[case("shape", "unsupported data type")]
    fn bad_columns_are_fatal(
        store: MemoryFeatureStore,
        driver: MemoryAttributeDriver,
        #[case] column: &str,
        #[case] message: &str,
    ) {
        let columns = vec![column.to_owned()];
        let mut selector =
            CategorySelector::resolve(&store, 1, None, &columns, Some(&driver)).expect("resolve");
        let error = selector
            .append_columns(&mut String::new(), 3, "|", 2)
            .expect_err("column should be rejected");
        assert!(error.to_string().contains(message), "{error}");
    }

    #[rstest]
    fn missing_binding_is_fatal(driver: MemoryAttributeDriver) {
        let error = CategorySelector::resolve(
            &MemoryFeatureStore::new(),
            1,
            Some("depth > 10"),
            &[],
            Some(&driver),
        )
        .expect_err("no binding");
        assert!(matches!(error, EncodeError::MissingFieldBinding { layer: 1 }));
    }

    #[rstest]
    fn open_failure_is_fatal(store: MemoryFeatureStore) {
        let driver = MemoryAttributeDriver::refusing();
        let error = CategorySelector::resolve(&store, 1, Some("x"), &[], Some(&driver))
            .expect_err("open should fail");
        assert!(matches!(error, EncodeError::OpenDatabase(_)));
    }

    #[rstest]
    fn query_failure_is_fatal(store: MemoryFeatureStore, driver: MemoryAttributeDriver) {
        let error = CategorySelector::resolve(&store, 1, Some("depth >"), &[], Some(&driver))
            .expect_err("query should fail");
        assert!(matches!(error, EncodeError::SelectKeys { .. }));
    }
}
