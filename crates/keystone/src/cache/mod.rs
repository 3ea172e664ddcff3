//! Cache backend implementations.
//!
//! This module provides concrete implementations of the `Cache` trait
//! defined in `keystone_core::cache`, selected via feature flags.
//!
//! # Feature Flags
//!
//! - `memory` (default): In-memory LRU cache with TTL
//! - `redis`: Redis cache using the redis crate

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p keystone --features memory"
);

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

#[cfg(feature = "memory")]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
