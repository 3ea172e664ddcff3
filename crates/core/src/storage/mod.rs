mod error;
mod http_mapping;
mod mapping;
mod schema;
mod stream;
mod traits;

pub use error::{RepositoryError, Result};
pub use http_mapping::{repository_error_reason, repository_error_to_status_code, ErrorBody};
pub use mapping::RowMapping;
pub use schema::{Column, TableSchema, MISSING_COLUMN, UNDECLARED_COLUMN};
pub use stream::{decode_rows, fetch_in_batches, EntityStream, DEFAULT_BATCH_SIZE};
pub use traits::{Repository, TransactionManager};
