use std::future::Future;

use async_trait::async_trait;

use crate::specification::{ListArgs, Specification};

use super::{EntityStream, Result};

/// Uniform data-access contract, implemented once per storage engine.
///
/// `E` is the entity type and `F` its filter family. Filter variants in a
/// specification set are combined with logical AND; `Limit`, `Offset` and
/// `Sort` only affect paginated reads.
#[async_trait]
pub trait Repository<E, F>: Send + Sync {
    /// Inserts the entity, replacing every column of an existing row with
    /// the same primary key.
    async fn save(&self, entity: &E) -> Result<()>;

    /// Gets the first entity matching the specifications, if any.
    async fn get(&self, specs: &[Specification<F>]) -> Result<Option<E>>;

    /// Returns true if at least one entity matches.
    async fn exist(&self, specs: &[Specification<F>]) -> Result<bool>;

    /// Deletes every entity matching the specifications.
    ///
    /// Deleting nothing is not an error.
    async fn delete(&self, specs: &[Specification<F>]) -> Result<()>;

    /// Lists the entities matching the filters, honouring sort and paging.
    async fn list(&self, args: &ListArgs<F>) -> Result<Vec<E>>;

    /// Runs the same query as [`Repository::list`], decoding one row per
    /// advance of the returned stream.
    async fn each(&self, args: &ListArgs<F>) -> Result<EntityStream<E>>;

    /// Counts the entities matching the filters. Paging is ignored.
    async fn size(&self, specs: &[Specification<F>]) -> Result<u32>;
}

/// Runs a unit of work inside a single transaction.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begins a transaction, makes it ambient for every repository call
    /// awaited inside `body`, then commits if `body` succeeds and rolls
    /// back otherwise.
    ///
    /// Calling `execute` from inside `body` starts a second, independent
    /// transaction.
    async fn execute<T, B, Fut>(&self, body: B) -> Result<T>
    where
        T: Send,
        B: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send;
}
