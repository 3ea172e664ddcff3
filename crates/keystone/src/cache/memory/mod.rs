//! In-memory cache backend.
//!
//! LRU-bounded and TTL-aware, for single-instance deployments and tests.

mod cache;

pub use cache::MemoryCache;
