//! In-memory repository implementation.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use keystone_core::query::{Condition, Value};
use keystone_core::specification::{
    offset_of, sort_of, ListArgs, SortArg, SortDirection, Specification,
};
use keystone_core::storage::{
    fetch_in_batches, EntityStream, Repository, RepositoryError, Result, RowMapping, TableSchema,
    DEFAULT_BATCH_SIZE,
};

use super::database::{InMemoryDatabase, Row, Table};

static NULL: Value = Value::Null;

/// Repository over one table of an [`InMemoryDatabase`].
///
/// Rows are kept in insertion order, which is the order reads return when
/// no sort applies. There is no transaction support.
pub struct InMemoryRepository<M: RowMapping> {
    database: InMemoryDatabase,
    schema: TableSchema,
    mapping: Arc<M>,
    batch_size: u32,
}

impl<M: RowMapping> InMemoryRepository<M> {
    /// Creates a repository after checking the catalog entry of the table
    /// against `schema`.
    pub async fn new(database: &InMemoryDatabase, schema: TableSchema, mapping: M) -> Result<Self> {
        let catalog = database.catalog(schema.table()).await;
        schema.check(&catalog)?;

        Ok(Self {
            database: database.clone(),
            schema,
            mapping: Arc::new(mapping),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Rows copied out per window by `each`. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn missing_table(&self) -> RepositoryError {
        missing_table(&self.schema)
    }

    async fn select(
        &self,
        condition: &Condition,
        sort: &[SortArg],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Vec<Value>>> {
        select_rows(&self.database, &self.schema, condition, sort, limit, offset).await
    }
}

fn missing_table(schema: &TableSchema) -> RepositoryError {
    RepositoryError::QueryFailed(format!("no such table: {}", schema.table()))
}

fn project(schema: &TableSchema, row: &Row) -> Vec<Value> {
    schema
        .column_names()
        .map(|name| row.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Rows matching `condition`, sorted and paged, projected in schema order.
async fn select_rows(
    database: &InMemoryDatabase,
    schema: &TableSchema,
    condition: &Condition,
    sort: &[SortArg],
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<Vec<Vec<Value>>> {
    let tables = database.tables().read().await;
    let table = tables
        .get(schema.table())
        .ok_or_else(|| missing_table(schema))?;

    let mut matched: Vec<&Row> = matching(table, condition).collect();
    let sort: Vec<_> = sort
        .iter()
        .filter(|arg| schema.has_column(&arg.column))
        .collect();
    if !sort.is_empty() {
        matched.sort_by(|a, b| compare_rows(a, b, &sort));
    }

    let rows = matched
        .into_iter()
        .skip(offset.unwrap_or(0) as usize)
        .take(limit.map_or(usize::MAX, |l| l as usize))
        .map(|row| project(schema, row))
        .collect();
    Ok(rows)
}

fn matching<'t>(table: &'t Table, condition: &'t Condition) -> impl Iterator<Item = &'t Row> {
    table
        .rows
        .iter()
        .filter(move |row| condition.evaluate(&|column: &str| row.get(column)))
}

fn compare_rows(a: &Row, b: &Row, sort: &[&SortArg]) -> Ordering {
    for arg in sort {
        let left = a.get(&arg.column).unwrap_or(&NULL);
        let right = b.get(&arg.column).unwrap_or(&NULL);
        let ordering = match arg.direction {
            SortDirection::Ascending => left.sort_cmp(right),
            SortDirection::Descending => right.sort_cmp(left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl<M: RowMapping> Repository<M::Entity, M::Filter> for InMemoryRepository<M> {
    async fn save(&self, entity: &M::Entity) -> Result<()> {
        let row: Row = self
            .schema
            .column_names()
            .map(str::to_string)
            .zip(self.mapping.encode(entity))
            .collect();
        let key = row.get(self.schema.primary_key()).cloned().unwrap_or(Value::Null);

        let mut tables = self.database.tables().write().await;
        let table = tables
            .get_mut(self.schema.table())
            .ok_or_else(|| self.missing_table())?;

        match table
            .rows
            .iter_mut()
            .find(|existing| existing.get(self.schema.primary_key()) == Some(&key))
        {
            Some(existing) => *existing = row,
            None => table.rows.push(row),
        }
        Ok(())
    }

    async fn get(&self, specs: &[Specification<M::Filter>]) -> Result<Option<M::Entity>> {
        let mut rows = self
            .select(
                &self.mapping.condition(specs),
                &sort_of(specs),
                Some(1),
                offset_of(specs),
            )
            .await?;
        match rows.pop() {
            Some(values) => self.mapping.decode(values).map(Some),
            None => Ok(None),
        }
    }

    async fn exist(&self, specs: &[Specification<M::Filter>]) -> Result<bool> {
        let condition = self.mapping.condition(specs);
        let tables = self.database.tables().read().await;
        let table = tables
            .get(self.schema.table())
            .ok_or_else(|| self.missing_table())?;
        let found = matching(table, &condition).next().is_some();
        Ok(found)
    }

    async fn delete(&self, specs: &[Specification<M::Filter>]) -> Result<()> {
        let condition = self.mapping.condition(specs);
        let mut tables = self.database.tables().write().await;
        let table = tables
            .get_mut(self.schema.table())
            .ok_or_else(|| self.missing_table())?;
        table
            .rows
            .retain(|row| !condition.evaluate(&|column: &str| row.get(column)));
        Ok(())
    }

    async fn list(&self, args: &ListArgs<M::Filter>) -> Result<Vec<M::Entity>> {
        self.select(
            &self.mapping.condition(&args.filters),
            &args.effective_sort(),
            args.effective_limit(),
            args.effective_offset(),
        )
        .await?
            .into_iter()
            .map(|values| self.mapping.decode(values))
            .collect()
    }

    async fn each(&self, args: &ListArgs<M::Filter>) -> Result<EntityStream<M::Entity>> {
        let database = self.database.clone();
        let schema = Arc::new(self.schema.clone());
        let condition = Arc::new(self.mapping.condition(&args.filters));
        let sort: Arc<[SortArg]> = args.effective_sort().into();
        let mapping = self.mapping.clone();

        let fetch = move |limit, offset| {
            let (database, schema, condition, sort) =
                (database.clone(), schema.clone(), condition.clone(), sort.clone());
            async move {
                select_rows(&database, &schema, &condition, &sort, Some(limit), Some(offset)).await
            }
        };

        Ok(fetch_in_batches(
            args.effective_limit(),
            args.effective_offset(),
            self.batch_size,
            fetch,
            move |values| mapping.decode(values),
        ))
    }

    async fn size(&self, specs: &[Specification<M::Filter>]) -> Result<u32> {
        let condition = self.mapping.condition(specs);
        let tables = self.database.tables().read().await;
        let table = tables
            .get(self.schema.table())
            .ok_or_else(|| self.missing_table())?;
        let count = matching(table, &condition).count();
        u32::try_from(count)
            .map_err(|_| RepositoryError::InvalidData(format!("Row count {count} out of range")))
    }
}
