use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keystone_core::query::{Condition, Value};
use keystone_core::specification::SortParams;
use keystone_core::storage::{RepositoryError, Result, RowMapping, TableSchema};

/// A user in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated UUID.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            age: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}

/// Filters understood by user repositories.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFilter {
    Id(Uuid),
    Ids(Vec<Uuid>),
    Email(String),
    /// SQL `LIKE` pattern over the name.
    NameLike(String),
    MinAge(u32),
    /// Not backed by a column; repositories ignore it.
    Active(bool),
}

/// Backend projection of a [`User`], one field per column.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub created_at: String,
}

/// Declared shape of the `users` table.
pub fn users_schema() -> TableSchema {
    TableSchema::new("users", "id")
        .column("id", "TEXT")
        .column("name", "TEXT")
        .column("email", "TEXT")
        .column("age", "INTEGER")
        .column("created_at", "TEXT")
}

/// Maps users to and from `users` rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMapping;

impl UserMapping {
    /// Columns a client may sort users by.
    pub fn sort_params() -> SortParams {
        SortParams::new(["name", "email", "age", "created_at"])
    }
}

fn invalid(column: &str, value: &Value) -> RepositoryError {
    RepositoryError::InvalidData(format!("users.{column}: unexpected value {value:?}"))
}

fn text(column: &str, value: Value) -> Result<String> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(invalid(column, &other)),
    }
}

impl RowMapping for UserMapping {
    type Entity = User;
    type Filter = UserFilter;
    type Row = UserRow;

    fn row(&self, user: &User) -> UserRow {
        UserRow {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age.map(i64::from),
            created_at: user.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }

    fn entity(&self, row: UserRow) -> Result<User> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| RepositoryError::InvalidData(format!("users.id: {e}")))?;
        let age = row
            .age
            .map(u32::try_from)
            .transpose()
            .map_err(|e| RepositoryError::InvalidData(format!("users.age: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| RepositoryError::InvalidData(format!("users.created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(User {
            id,
            name: row.name,
            email: row.email,
            age,
            created_at,
        })
    }

    fn values(&self, row: &UserRow) -> Vec<Value> {
        vec![
            Value::from(row.id.as_str()),
            Value::from(row.name.as_str()),
            Value::from(row.email.as_str()),
            Value::from(row.age),
            Value::from(row.created_at.as_str()),
        ]
    }

    fn scan(&self, values: Vec<Value>) -> Result<UserRow> {
        let [id, name, email, age, created_at] = <[Value; 5]>::try_from(values).map_err(|v| {
            RepositoryError::InvalidData(format!("users: expected 5 columns, got {}", v.len()))
        })?;

        let age = match age {
            Value::Null => None,
            Value::Integer(age) => Some(age),
            other => return Err(invalid("age", &other)),
        };

        Ok(UserRow {
            id: text("id", id)?,
            name: text("name", name)?,
            email: text("email", email)?,
            age,
            created_at: text("created_at", created_at)?,
        })
    }

    fn filter(&self, filter: &UserFilter) -> Option<Condition> {
        match filter {
            UserFilter::Id(id) => Some(Condition::eq("id", id.to_string())),
            UserFilter::Ids(ids) => Some(Condition::is_in(
                "id",
                ids.iter().map(|id| id.to_string()),
            )),
            UserFilter::Email(email) => Some(Condition::eq("email", email.as_str())),
            UserFilter::NameLike(pattern) => Some(Condition::like("name", pattern.as_str())),
            UserFilter::MinAge(age) => Some(Condition::gte("age", *age)),
            UserFilter::Active(_) => None,
        }
    }
}
