//! Statement execution routed to the ambient transaction or the default
//! connection.

use std::time::Instant;

use rusqlite::params_from_iter;
use tokio_rusqlite::Connection;

use keystone_core::query::Value;
use keystone_core::storage::Result;

use super::conversions::{from_sql, to_sql};
use super::database::SqliteDatabase;
use super::error::{map_tokio_rusqlite_error, wrap_err};
use super::query::Statement;
use super::transaction::ambient_connection;

/// Executes statements against a [`SqliteDatabase`].
///
/// The handle is chosen per call: the ambient transaction's connection when
/// one is active for this database, the default connection otherwise.
#[derive(Debug, Clone)]
pub struct Querier {
    database: SqliteDatabase,
}

impl Querier {
    pub fn new(database: SqliteDatabase) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &SqliteDatabase {
        &self.database
    }

    fn handle(&self) -> (Connection, bool) {
        match ambient_connection(self.database.id()) {
            Some(conn) => (conn, true),
            None => (self.database.connection().clone(), false),
        }
    }

    /// Runs a statement that returns rows. Each row holds every result
    /// column in order.
    pub async fn query(&self, statement: Statement) -> Result<Vec<Vec<Value>>> {
        let (conn, transactional) = self.handle();
        let Statement { sql, args } = statement;
        let logged = (sql.clone(), args.clone());
        let start = Instant::now();

        let result = conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let width = stmt.column_count();
                let mut rows = stmt
                    .query(params_from_iter(args.iter().map(to_sql)))
                    .map_err(wrap_err)?;

                let mut fetched = Vec::new();
                while let Some(row) = rows.next().map_err(wrap_err)? {
                    let mut values = Vec::with_capacity(width);
                    for i in 0..width {
                        values.push(from_sql(row.get_ref(i).map_err(wrap_err)?));
                    }
                    fetched.push(values);
                }
                Ok(fetched)
            })
            .await;

        log_statement(&logged.0, &logged.1, start, transactional);
        result.map_err(map_tokio_rusqlite_error)
    }

    /// Runs a statement for its effect and returns the number of changed
    /// rows.
    pub async fn exec(&self, statement: Statement) -> Result<usize> {
        let (conn, transactional) = self.handle();
        let Statement { sql, args } = statement;
        let logged = (sql.clone(), args.clone());
        let start = Instant::now();

        let result = conn
            .call(move |conn| {
                conn.execute(&sql, params_from_iter(args.iter().map(to_sql)))
                    .map_err(wrap_err)
            })
            .await;

        log_statement(&logged.0, &logged.1, start, transactional);
        result.map_err(map_tokio_rusqlite_error)
    }
}

fn log_statement(sql: &str, args: &[Value], start: Instant, transactional: bool) {
    tracing::debug!(
        statement = %sql,
        args = ?args,
        took_ms = start.elapsed().as_millis() as u64,
        transactional,
        "Executed statement"
    );
}
