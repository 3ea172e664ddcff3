use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use keystone_core::query::Value;
use keystone_core::storage::TableSchema;

/// A stored row, keyed by column name.
pub(crate) type Row = HashMap<String, Value>;

#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) schema: TableSchema,
    pub(crate) rows: Vec<Row>,
}

/// Catalog of in-memory tables.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table. An existing table with the same name is kept as is.
    pub async fn create_table(&self, schema: &TableSchema) {
        let mut tables = self.tables.write().await;
        tables
            .entry(schema.table().to_string())
            .or_insert_with(|| Table {
                schema: schema.clone(),
                rows: Vec::new(),
            });
    }

    /// Drops a table and its rows.
    pub async fn drop_table(&self, table: &str) {
        self.tables.write().await.remove(table);
    }

    /// `(name, type)` of every column of a table; empty when it does not
    /// exist.
    pub async fn catalog(&self, table: &str) -> Vec<(String, String)> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(|t| {
                t.schema
                    .columns()
                    .iter()
                    .map(|c| (c.name.clone(), c.sql_type.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn tables(&self) -> &RwLock<HashMap<String, Table>> {
        &self.tables
    }
}
