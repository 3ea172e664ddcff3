//! Connection provider for SQLite databases.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_rusqlite::Connection;
use uuid::Uuid;

use keystone_core::storage::{RepositoryError, Result};

use super::error::{map_tokio_rusqlite_error, wrap_err};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Location {
    File(PathBuf),
    /// Named shared-cache in-memory database.
    Memory(String),
}

/// A SQLite database: where it lives, its default connection, and an
/// identity that ambient transactions are tagged with.
///
/// Cloning is cheap and clones share the default connection.
#[derive(Clone)]
pub struct SqliteDatabase {
    id: Uuid,
    location: Arc<Location>,
    conn: Connection,
}

impl SqliteDatabase {
    /// Opens (creating if needed) a file-backed database.
    ///
    /// File databases run in WAL mode so readers and a writer on separate
    /// connections do not block each other.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let location = Location::File(path.as_ref().to_path_buf());
        Self::from_location(location).await
    }

    /// Opens a private in-memory database.
    ///
    /// Transaction connections share it through SQLite's shared cache, which
    /// locks per table: two concurrent writers fail fast with a locked error
    /// instead of waiting.
    pub async fn open_in_memory() -> Result<Self> {
        let name = format!("file:keystone-{}?mode=memory&cache=shared", Uuid::new_v4());
        Self::from_location(Location::Memory(name)).await
    }

    async fn from_location(location: Location) -> Result<Self> {
        let location = Arc::new(location);
        let conn = connect_to(&location).await?;
        let id = Uuid::new_v4();

        tracing::debug!(database = %id, location = ?location, "Opened SQLite database");

        Ok(Self { id, location, conn })
    }

    /// Identity of this database. Ambient transactions opened on another
    /// database are invisible to it.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The default connection, used outside transactions.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Opens a new dedicated connection to the same database.
    pub async fn connect(&self) -> Result<Connection> {
        connect_to(&self.location).await
    }

    /// Runs one or more `;`-separated statements on the default connection.
    pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
        let sql = sql.into();
        self.conn
            .call(move |conn| conn.execute_batch(&sql).map_err(wrap_err))
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    /// Closes the default connection. Clones of this database lose it too.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(map_tokio_rusqlite_error)
    }
}

impl fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDatabase")
            .field("id", &self.id)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

async fn connect_to(location: &Location) -> Result<Connection> {
    // Default open flags include SQLITE_OPEN_URI, which `Memory` names need.
    let (conn, wal) = match location {
        Location::File(path) => (Connection::open(path).await, true),
        Location::Memory(name) => (Connection::open(name).await, false),
    };
    let conn = conn.map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

    conn.call(move |conn| {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(wrap_err)?;
        if wal {
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })
            .map_err(wrap_err)?;
        }
        Ok(())
    })
    .await
    .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

    Ok(conn)
}
