//! Embedded in-memory storage backend.
//!
//! Tables live in a process-local catalog; repositories evaluate the same
//! `Condition` predicates the SQL backend renders, with SQL semantics.

mod database;
mod repository;

pub use database::InMemoryDatabase;
pub use repository::InMemoryRepository;
