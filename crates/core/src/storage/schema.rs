use super::{RepositoryError, Result};

/// Reported as the found type when a declared column is absent.
pub const MISSING_COLUMN: &str = "<missing>";

/// Reported as the expected type when the table has a column that was
/// never declared.
pub const UNDECLARED_COLUMN: &str = "<undeclared>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
}

/// Static description of a table a repository reads and writes.
///
/// Column order is significant: it is the order of
/// [`RowMapping::values`](super::RowMapping::values) and of every `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: String,
    primary_key: String,
    columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
            columns: Vec::new(),
        }
    }

    /// Declares the next column with its expected catalog type.
    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            sql_type: sql_type.into(),
        });
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Index of a column in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Compares the declared columns with `(name, type)` pairs read from a
    /// backend catalog.
    ///
    /// Every catalog column must be declared with exactly the same type, and
    /// every declared column must be present. The first violation is
    /// returned as [`RepositoryError::SchemaMismatch`].
    pub fn check(&self, actual: &[(String, String)]) -> Result<()> {
        for (name, found) in actual {
            let expected = self
                .columns
                .iter()
                .find(|c| &c.name == name)
                .map(|c| c.sql_type.as_str());
            if expected != Some(found.as_str()) {
                return Err(self.mismatch(
                    name,
                    expected.unwrap_or(UNDECLARED_COLUMN),
                    found,
                ));
            }
        }

        for column in &self.columns {
            if !actual.iter().any(|(name, _)| name == &column.name) {
                return Err(self.mismatch(&column.name, &column.sql_type, MISSING_COLUMN));
            }
        }

        Ok(())
    }

    fn mismatch(&self, column: &str, expected: &str, found: &str) -> RepositoryError {
        RepositoryError::SchemaMismatch {
            table: self.table.clone(),
            column: column.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
