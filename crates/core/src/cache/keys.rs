//! Cache key derivation.
//!
//! A key is `hex(md5("{resource}.{ACTION}/{json}"))` where `json` is a
//! canonical rendering of the request: object keys sorted, filter
//! specifications sorted by their rendering, positional specifications
//! (limit, offset, sort) kept in order after the filters. Logically
//! identical requests therefore map to the same key.

use std::fmt;

use md5::{Digest, Md5};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::specification::{ListArgs, Specification};

use super::{CacheError, Result};

/// The read operation a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheAction {
    Get,
    Exist,
    List,
    Size,
}

impl CacheAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheAction::Get => "GET",
            CacheAction::Exist => "EXIST",
            CacheAction::List => "LIST",
            CacheAction::Size => "SIZE",
        }
    }
}

impl fmt::Display for CacheAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes a value to JSON with object keys in sorted order.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_json_value(value).map(|v| v.to_string())
}

/// Canonical JSON array for a specification set.
pub fn canonical_specifications<F: Serialize>(specs: &[Specification<F>]) -> Result<JsonValue> {
    let mut canonical = sorted_filters(specs.iter().filter(|spec| spec.is_filter()))?;
    for spec in specs.iter().filter(|spec| !spec.is_filter()) {
        canonical.push(to_json_value(spec)?);
    }
    Ok(JsonValue::Array(canonical))
}

/// Key for an action over a specification set.
pub fn specifications_key<F: Serialize>(
    resource: &str,
    action: CacheAction,
    specs: &[Specification<F>],
) -> Result<String> {
    Ok(cache_key(resource, action, &canonical_specifications(specs)?))
}

/// Key for a `LIST` over list arguments.
///
/// Explicit and specification-borne paging resolve to the same values, so
/// both spellings of a request share a key.
pub fn list_args_key<F: Serialize>(resource: &str, args: &ListArgs<F>) -> Result<String> {
    let filters = sorted_filters(args.filters.iter().filter(|spec| spec.is_filter()))?;
    let input = json!({
        "filters": filters,
        "sort": to_json_value(&args.effective_sort())?,
        "limit": args.effective_limit(),
        "offset": args.effective_offset(),
    });
    Ok(cache_key(resource, CacheAction::List, &input))
}

/// Hashes an already canonical JSON value into a key.
pub fn cache_key(resource: &str, action: CacheAction, input: &JsonValue) -> String {
    let digest = Md5::digest(format!("{resource}.{action}/{input}").as_bytes());
    hex::encode(digest)
}

fn sorted_filters<'a, F: Serialize + 'a>(
    filters: impl Iterator<Item = &'a Specification<F>>,
) -> Result<Vec<JsonValue>> {
    let mut rendered = filters
        .map(|spec| to_json_value(spec).map(|value| (value.to_string(), value)))
        .collect::<Result<Vec<_>>>()?;
    rendered.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(rendered.into_iter().map(|(_, value)| value).collect())
}

fn to_json_value<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| CacheError::Serialization(e.to_string()))
}
