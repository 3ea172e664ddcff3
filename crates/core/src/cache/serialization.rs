//! JSON payloads for cache storage.
//!
//! Entities, lists, booleans and counts are all stored as JSON so cached
//! values stay human-readable when inspected in the backend.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheError, Result};

/// Serializes a value to JSON bytes.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes JSON bytes into a value.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}
