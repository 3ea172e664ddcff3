mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    cache_key, canonical_json, canonical_specifications, list_args_key, specifications_key,
    CacheAction,
};
pub use serialization::{deserialize, serialize};
pub use traits::Cache;
