//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `keystone_core::storage`. Backends are selected at compile time
//! via feature flags and may be enabled together.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): relational backend using `rusqlite` and `tokio-rusqlite`
//! - `inmemory` (default): embedded backend keeping tables in process memory
//!
//! The cache decorator in [`cached`] works over any of them.

#[cfg(not(any(feature = "sqlite", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'sqlite' or 'inmemory' feature. \
    Example: cargo build -p keystone --features sqlite"
);

pub mod cached;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cached::CachedRepository;

#[cfg(feature = "inmemory")]
pub use inmemory::{InMemoryDatabase, InMemoryRepository};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteDatabase, SqliteRepository, SqliteTransactionManager};
