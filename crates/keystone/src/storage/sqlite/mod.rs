//! SQLite storage backend.
//!
//! Uses `rusqlite` for the synchronous driver and `tokio-rusqlite` to run it
//! on a dedicated thread per connection. Every statement goes through a
//! [`Querier`], which routes it to the ambient transaction opened by
//! [`SqliteTransactionManager`] when there is one.

mod conversions;
mod database;
mod error;
mod querier;
mod query;
mod repository;
mod schema;
mod transaction;

pub use database::SqliteDatabase;
pub use error::map_tokio_rusqlite_error;
pub use querier::Querier;
pub use query::Statement;
pub use repository::SqliteRepository;
pub use schema::create_table_sql;
pub use transaction::{in_transaction, SqliteTransactionManager};
