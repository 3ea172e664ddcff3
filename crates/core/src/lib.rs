//! Storage-agnostic building blocks for keystone repositories.
//!
//! This crate holds pure types and traits only: the [`storage::Repository`]
//! contract, specifications and predicates, pagination arithmetic and cache
//! key derivation. Backends live in the `keystone` crate.

pub mod cache;
pub mod pagination;
pub mod query;
pub mod specification;
pub mod storage;
