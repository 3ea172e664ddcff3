mod user;

pub use user::{users_schema, User, UserFilter, UserMapping, UserRow};
