use serde::Serialize;
use thiserror::Error;

/// Direction of a single sort argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A column to order by, with its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SortArg {
    pub column: String,
    pub direction: SortDirection,
}

impl SortArg {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }
}

/// Errors produced while parsing a sort parameter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortParamsError {
    #[error("Sort parameter is not valid. Please pass valid sort parameters.")]
    InvalidSortParams { column: String },
}

/// Parses user-supplied sort strings against an allow-list of columns.
///
/// The accepted syntax is a comma separated list of column names, each
/// optionally prefixed with `-` (descending) or `+` (ascending):
///
/// ```
/// use keystone_core::specification::{SortArg, SortParams};
///
/// let params = SortParams::new(["name", "created_at"]);
/// let args = params.parse("-created_at,+name").unwrap();
///
/// assert_eq!(args, vec![SortArg::desc("created_at"), SortArg::asc("name")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParams {
    columns: Vec<String>,
}

impl SortParams {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    fn column_allowed(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Parses a sort string. An empty (or all-whitespace) input yields no arguments.
    pub fn parse(&self, input: &str) -> Result<Vec<SortArg>, SortParamsError> {
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        input
            .split(',')
            .map(|candidate| {
                let candidate = candidate.trim();
                let (direction, column) = match candidate.strip_prefix('-') {
                    Some(rest) => (SortDirection::Descending, rest),
                    None => (
                        SortDirection::Ascending,
                        candidate.strip_prefix('+').unwrap_or(candidate),
                    ),
                };

                if !self.column_allowed(column) {
                    return Err(SortParamsError::InvalidSortParams {
                        column: column.to_string(),
                    });
                }

                Ok(SortArg::new(column, direction))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SortParams {
        SortParams::new(["name", "email", "created_at"])
    }

    #[test]
    fn test_parse_plain_column_is_ascending() {
        assert_eq!(params().parse("name").unwrap(), vec![SortArg::asc("name")]);
    }

    #[test]
    fn test_parse_prefixes() {
        let args = params().parse("-created_at,+email,name").unwrap();
        assert_eq!(
            args,
            vec![
                SortArg::desc("created_at"),
                SortArg::asc("email"),
                SortArg::asc("name"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(params().parse("").unwrap().is_empty());
        assert!(params().parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_column() {
        let err = params().parse("name,-password").unwrap_err();
        assert_eq!(
            err,
            SortParamsError::InvalidSortParams {
                column: "password".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(params().parse("name,,email").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SortParamsError::InvalidSortParams {
            column: "x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Sort parameter is not valid. Please pass valid sort parameters."
        );
    }
}
