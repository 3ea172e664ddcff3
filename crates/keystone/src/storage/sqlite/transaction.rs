//! Transaction coordinator and the ambient transaction slot.
//!
//! [`SqliteTransactionManager::execute`] opens a dedicated connection,
//! begins a transaction on it and runs the body with that connection stored
//! in a task-local slot. Every [`Querier`](super::Querier) call awaited
//! inside the body picks it up without the handle being passed around.
//!
//! The slot is task-local: work moved to another task with `tokio::spawn`
//! runs outside the transaction.

use std::future::Future;

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use keystone_core::storage::{RepositoryError, Result, TransactionManager};

use super::database::SqliteDatabase;
use super::error::wrap_err;

tokio::task_local! {
    static AMBIENT: AmbientTransaction;
}

/// A begun transaction, tagged with the database it belongs to.
#[derive(Clone)]
struct AmbientTransaction {
    database: Uuid,
    conn: Connection,
}

/// Connection of the ambient transaction, if one is active on this task for
/// `database`. A transaction of any other database counts as absent.
pub(crate) fn ambient_connection(database: Uuid) -> Option<Connection> {
    AMBIENT
        .try_with(|tx| (tx.database == database).then(|| tx.conn.clone()))
        .ok()
        .flatten()
}

/// True while running inside a transaction body on this task.
pub fn in_transaction() -> bool {
    AMBIENT.try_with(|_| ()).is_ok()
}

/// Runs units of work atomically against one [`SqliteDatabase`].
#[derive(Debug, Clone)]
pub struct SqliteTransactionManager {
    database: SqliteDatabase,
}

impl SqliteTransactionManager {
    pub fn new(database: SqliteDatabase) -> Self {
        Self { database }
    }
}

async fn run_batch(conn: &Connection, sql: &'static str) -> std::result::Result<(), String> {
    conn.call(move |conn| conn.execute_batch(sql).map_err(wrap_err))
        .await
        .map_err(|e| e.to_string())
}

#[async_trait]
impl TransactionManager for SqliteTransactionManager {
    async fn execute<T, B, Fut>(&self, body: B) -> Result<T>
    where
        T: Send,
        B: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let database = self.database.id();
        let conn = self.database.connect().await?;
        run_batch(&conn, "BEGIN")
            .await
            .map_err(RepositoryError::TransactionFailed)?;
        tracing::debug!(database = %database, "Transaction started");

        let ambient = AmbientTransaction {
            database,
            conn: conn.clone(),
        };
        let outcome = AMBIENT.scope(ambient, body()).await;

        match outcome {
            Ok(value) => {
                run_batch(&conn, "COMMIT")
                    .await
                    .map_err(RepositoryError::TransactionFailed)?;
                tracing::debug!(database = %database, "Transaction committed");
                Ok(value)
            }
            Err(cause) => {
                if let Err(rollback) = run_batch(&conn, "ROLLBACK").await {
                    tracing::debug!(
                        database = %database,
                        error = %rollback,
                        cause = %cause,
                        "Transaction rollback failed"
                    );
                    return Err(RepositoryError::RollbackFailed {
                        rollback,
                        cause: Box::new(cause),
                    });
                }
                tracing::debug!(database = %database, error = %cause, "Transaction aborted");
                Err(cause)
            }
        }
    }
}
