//! Redis cache backend.
//!
//! Shares cached values across instances. Entries expire through Redis TTLs
//! only; nothing here invalidates across processes.

mod cache;
mod error;

pub use cache::RedisCache;
pub use error::map_redis_error;
