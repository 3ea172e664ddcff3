//! Backend-agnostic predicate values.
//!
//! Entity filters are translated into [`Condition`] trees over column
//! [`Value`]s. Each storage backend renders or evaluates the same tree, so
//! no backend-specific type leaks into entity definitions.

mod condition;
mod like;
mod value;

pub use condition::Condition;
pub use like::like_matches;
pub use value::Value;
