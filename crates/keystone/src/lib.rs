//! Repository backends, cache backends and the sample `users` model.
//!
//! Contracts live in `keystone_core`; this crate provides the SQLite and
//! in-memory repositories, the read-through cache decorator and the cache
//! clients it runs on.

pub mod cache;
pub mod config;
pub mod models;
pub mod storage;
