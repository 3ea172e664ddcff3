//! Generic SQLite repository.

use std::sync::Arc;

use async_trait::async_trait;

use keystone_core::query::Value;
use keystone_core::specification::{offset_of, sort_of, ListArgs, SortArg, Specification};
use keystone_core::storage::{
    fetch_in_batches, EntityStream, Repository, RepositoryError, Result, RowMapping, TableSchema,
    DEFAULT_BATCH_SIZE,
};

use super::database::SqliteDatabase;
use super::querier::Querier;
use super::query;

/// Repository over one SQLite table, generic over a [`RowMapping`].
///
/// Construction checks the live table against the declared [`TableSchema`]
/// and fails with [`RepositoryError::SchemaMismatch`] on drift.
///
/// `each` reads the result in `LIMIT`/`OFFSET` windows of `batch_size` rows,
/// each window fetched when the stream reaches it.
pub struct SqliteRepository<M: RowMapping> {
    querier: Querier,
    schema: TableSchema,
    mapping: Arc<M>,
    batch_size: u32,
}

impl<M: RowMapping> SqliteRepository<M> {
    pub async fn new(database: &SqliteDatabase, schema: TableSchema, mapping: M) -> Result<Self> {
        let querier = Querier::new(database.clone());

        let catalog = querier
            .query(query::table_info(schema.table()))
            .await?
            .into_iter()
            .map(|row| match <[Value; 2]>::try_from(row) {
                Ok([Value::Text(name), Value::Text(sql_type)]) => Ok((name, sql_type)),
                _ => Err(RepositoryError::InvalidData(format!(
                    "Unexpected catalog row for table {}",
                    schema.table()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        schema.check(&catalog)?;

        tracing::debug!(table = %schema.table(), columns = catalog.len(), "Schema check passed");

        Ok(Self {
            querier,
            schema,
            mapping: Arc::new(mapping),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Rows fetched per window by `each`. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Sort for windowed reads. Ties are broken by primary key so that
    /// consecutive windows neither repeat nor skip rows.
    fn window_sort(&self, mut sort: Vec<SortArg>) -> Vec<SortArg> {
        let primary_key = self.schema.primary_key();
        if !sort.is_empty() && !sort.iter().any(|arg| arg.column == primary_key) {
            sort.push(SortArg::asc(primary_key));
        }
        sort
    }

    async fn select(&self, args: &ListArgs<M::Filter>) -> Result<Vec<Vec<Value>>> {
        let statement = query::select(
            &self.schema,
            &self.mapping.condition(&args.filters),
            &args.effective_sort(),
            args.effective_limit(),
            args.effective_offset(),
        );
        self.querier.query(statement).await
    }
}

#[async_trait]
impl<M: RowMapping> Repository<M::Entity, M::Filter> for SqliteRepository<M> {
    async fn save(&self, entity: &M::Entity) -> Result<()> {
        let statement = query::upsert(&self.schema, self.mapping.encode(entity));
        self.querier.exec(statement).await?;
        Ok(())
    }

    async fn get(&self, specs: &[Specification<M::Filter>]) -> Result<Option<M::Entity>> {
        let statement = query::select(
            &self.schema,
            &self.mapping.condition(specs),
            &sort_of(specs),
            Some(1),
            offset_of(specs),
        );
        let mut rows = self.querier.query(statement).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        self.mapping.decode(rows.swap_remove(0)).map(Some)
    }

    async fn exist(&self, specs: &[Specification<M::Filter>]) -> Result<bool> {
        let statement = query::exists(&self.schema, &self.mapping.condition(specs));
        let rows = self.querier.query(statement).await?;
        Ok(matches!(rows.as_slice(), [row] if row.as_slice() == [Value::Integer(1)]))
    }

    async fn delete(&self, specs: &[Specification<M::Filter>]) -> Result<()> {
        let statement = query::delete(&self.schema, &self.mapping.condition(specs));
        let deleted = self.querier.exec(statement).await?;
        tracing::trace!(table = %self.schema.table(), deleted, "Deleted rows");
        Ok(())
    }

    async fn list(&self, args: &ListArgs<M::Filter>) -> Result<Vec<M::Entity>> {
        self.select(args)
            .await?
            .into_iter()
            .map(|values| self.mapping.decode(values))
            .collect()
    }

    async fn each(&self, args: &ListArgs<M::Filter>) -> Result<EntityStream<M::Entity>> {
        let querier = self.querier.clone();
        let schema = self.schema.clone();
        let condition = self.mapping.condition(&args.filters);
        let sort = self.window_sort(args.effective_sort());
        let mapping = self.mapping.clone();

        let fetch = move |limit, offset| {
            let statement = query::select(&schema, &condition, &sort, Some(limit), Some(offset));
            let querier = querier.clone();
            async move { querier.query(statement).await }
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
        let statement = query::count(&self.schema, &self.mapping.condition(specs));
        let rows = self.querier.query(statement).await?;
        match rows.first().and_then(|row| row.first()) {
            Some(Value::Integer(count)) => u32::try_from(*count).map_err(|_| {
                RepositoryError::InvalidData(format!("Row count {count} out of range"))
            }),
            _ => Err(RepositoryError::InvalidData(
                "COUNT(*) returned no integer".to_string(),
            )),
        }
    }
}
