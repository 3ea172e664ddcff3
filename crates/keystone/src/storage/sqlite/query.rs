//! SQL rendering for conditions, paging and the fixed repository statements.
//!
//! Pure functions: they build statement text plus positional arguments and
//! never touch a connection.

use keystone_core::query::{Condition, Value};
use keystone_core::specification::{SortArg, SortDirection};
use keystone_core::storage::TableSchema;

/// Statement text with its positional (`?`) arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// Quotes an identifier, doubling embedded quotes.
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_list(schema: &TableSchema) -> String {
    schema
        .column_names()
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Appends the SQL form of `condition` to `sql`, pushing its arguments.
pub fn render_condition(condition: &Condition, sql: &mut String, args: &mut Vec<Value>) {
    match condition {
        Condition::Eq(c, v) => render_comparison(c, "=", v, sql, args),
        Condition::Ne(c, v) => render_comparison(c, "<>", v, sql, args),
        Condition::Lt(c, v) => render_comparison(c, "<", v, sql, args),
        Condition::Lte(c, v) => render_comparison(c, "<=", v, sql, args),
        Condition::Gt(c, v) => render_comparison(c, ">", v, sql, args),
        Condition::Gte(c, v) => render_comparison(c, ">=", v, sql, args),
        Condition::Like(c, pattern) => {
            sql.push_str(&format!("{} LIKE ?", quote(c)));
            args.push(Value::Text(pattern.clone()));
        }
        Condition::IsNull(c) => sql.push_str(&format!("{} IS NULL", quote(c))),
        Condition::IsNotNull(c) => sql.push_str(&format!("{} IS NOT NULL", quote(c))),
        Condition::In(_, values) if values.is_empty() => sql.push_str("0 = 1"),
        Condition::In(c, values) => {
            let marks = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!("{} IN ({marks})", quote(c)));
            args.extend(values.iter().cloned());
        }
        Condition::And(parts) => render_group(parts, " AND ", "1 = 1", sql, args),
        Condition::Or(parts) => render_group(parts, " OR ", "0 = 1", sql, args),
    }
}

fn render_comparison(
    column: &str,
    op: &str,
    value: &Value,
    sql: &mut String,
    args: &mut Vec<Value>,
) {
    sql.push_str(&format!("{} {op} ?", quote(column)));
    args.push(value.clone());
}

fn render_group(
    parts: &[Condition],
    separator: &str,
    identity: &str,
    sql: &mut String,
    args: &mut Vec<Value>,
) {
    let parts: Vec<_> = parts.iter().filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => sql.push_str(identity),
        [single] => render_condition(single, sql, args),
        _ => {
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    sql.push_str(separator);
                }
                sql.push('(');
                render_condition(part, sql, args);
                sql.push(')');
            }
        }
    }
}

fn push_where(condition: &Condition, sql: &mut String, args: &mut Vec<Value>) {
    if !condition.is_empty() {
        sql.push_str(" WHERE ");
        render_condition(condition, sql, args);
    }
}

/// `ORDER BY` over declared columns; arguments naming anything else are
/// dropped.
fn push_order_by(schema: &TableSchema, sort: &[SortArg], sql: &mut String) {
    let terms: Vec<_> = sort
        .iter()
        .filter(|arg| schema.has_column(&arg.column))
        .map(|arg| {
            let direction = match arg.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            format!("{} {direction}", quote(&arg.column))
        })
        .collect();
    if !terms.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms.join(", "));
    }
}

/// SQLite needs a `LIMIT` before `OFFSET`; `-1` means unbounded.
fn push_paging(limit: Option<u32>, offset: Option<u32>, sql: &mut String, args: &mut Vec<Value>) {
    match (limit, offset) {
        (None, None) => {}
        (limit, offset) => {
            sql.push_str(" LIMIT ?");
            args.push(limit.map_or(Value::Integer(-1), Value::from));
            if let Some(offset) = offset {
                sql.push_str(" OFFSET ?");
                args.push(Value::from(offset));
            }
        }
    }
}

/// `SELECT <columns> FROM <table> [WHERE] [ORDER BY] [LIMIT [OFFSET]]`.
pub fn select(
    schema: &TableSchema,
    condition: &Condition,
    sort: &[SortArg],
    limit: Option<u32>,
    offset: Option<u32>,
) -> Statement {
    let mut sql = format!(
        "SELECT {} FROM {}",
        column_list(schema),
        quote(schema.table())
    );
    let mut args = Vec::new();
    push_where(condition, &mut sql, &mut args);
    push_order_by(schema, sort, &mut sql);
    push_paging(limit, offset, &mut sql, &mut args);
    Statement { sql, args }
}

/// `SELECT 1 FROM <table> [WHERE] LIMIT 1`.
pub fn exists(schema: &TableSchema, condition: &Condition) -> Statement {
    let mut sql = format!("SELECT 1 FROM {}", quote(schema.table()));
    let mut args = Vec::new();
    push_where(condition, &mut sql, &mut args);
    sql.push_str(" LIMIT 1");
    Statement { sql, args }
}

/// `SELECT COUNT(*) FROM <table> [WHERE]`.
pub fn count(schema: &TableSchema, condition: &Condition) -> Statement {
    let mut sql = format!("SELECT COUNT(*) FROM {}", quote(schema.table()));
    let mut args = Vec::new();
    push_where(condition, &mut sql, &mut args);
    Statement { sql, args }
}

/// `DELETE FROM <table> [WHERE]`.
pub fn delete(schema: &TableSchema, condition: &Condition) -> Statement {
    let mut sql = format!("DELETE FROM {}", quote(schema.table()));
    let mut args = Vec::new();
    push_where(condition, &mut sql, &mut args);
    Statement { sql, args }
}

/// Insert that replaces every declared column when the primary key exists.
pub fn upsert(schema: &TableSchema, values: Vec<Value>) -> Statement {
    let marks = vec!["?"; schema.columns().len()].join(", ");
    let assignments = schema
        .column_names()
        .map(|c| format!("{0} = excluded.{0}", quote(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({marks}) ON CONFLICT ({}) DO UPDATE SET {assignments}",
        quote(schema.table()),
        column_list(schema),
        quote(schema.primary_key()),
    );
    Statement { sql, args: values }
}

/// Catalog query returning `(name, type)` for every column of a table.
pub fn table_info(table: &str) -> Statement {
    Statement {
        sql: "SELECT name, type FROM pragma_table_info(?)".to_string(),
        args: vec![Value::from(table)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableSchema {
        TableSchema::new("users", "id")
            .column("id", "TEXT")
            .column("name", "TEXT")
            .column("age", "INTEGER")
    }

    fn render(condition: &Condition) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut args = Vec::new();
        render_condition(condition, &mut sql, &mut args);
        (sql, args)
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote("name"), r#""name""#);
        assert_eq!(quote(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn test_render_comparisons() {
        assert_eq!(
            render(&Condition::gte("age", 18)),
            (r#""age" >= ?"#.to_string(), vec![Value::Integer(18)])
        );
        assert_eq!(
            render(&Condition::ne("name", "ada")),
            (r#""name" <> ?"#.to_string(), vec![Value::from("ada")])
        );
    }

    #[test]
    fn test_render_in_and_empty_in() {
        assert_eq!(
            render(&Condition::is_in("id", ["a", "b"])),
            (
                r#""id" IN (?, ?)"#.to_string(),
                vec![Value::from("a"), Value::from("b")]
            )
        );
        assert_eq!(
            render(&Condition::is_in("id", Vec::<Value>::new())).0,
            "0 = 1"
        );
    }

    #[test]
    fn test_render_nested_groups() {
        let condition = Condition::all([
            Condition::eq("name", "ada"),
            Condition::any([Condition::IsNull("age".to_string()), Condition::lt("age", 30)]),
        ]);

        let (sql, args) = render(&condition);

        assert_eq!(
            sql,
            r#"("name" = ?) AND (("age" IS NULL) OR ("age" < ?))"#
        );
        assert_eq!(args, vec![Value::from("ada"), Value::Integer(30)]);
    }

    #[test]
    fn test_render_empty_groups() {
        assert_eq!(render(&Condition::all([])).0, "1 = 1");
        assert_eq!(render(&Condition::any([])).0, "0 = 1");
    }

    #[test]
    fn test_select_with_everything() {
        let statement = select(
            &users(),
            &Condition::all([Condition::like("name", "a%")]),
            &[SortArg::desc("age"), SortArg::asc("password")],
            Some(10),
            Some(20),
        );

        assert_eq!(
            statement.sql,
            r#"SELECT "id", "name", "age" FROM "users" WHERE "name" LIKE ? ORDER BY "age" DESC LIMIT ? OFFSET ?"#
        );
        assert_eq!(
            statement.args,
            vec![Value::from("a%"), Value::Integer(10), Value::Integer(20)]
        );
    }

    #[test]
    fn test_select_without_filters_has_no_where() {
        let statement = select(&users(), &Condition::all([]), &[], None, None);

        assert_eq!(statement.sql, r#"SELECT "id", "name", "age" FROM "users""#);
        assert!(statement.args.is_empty());
    }

    #[test]
    fn test_offset_without_limit_is_unbounded() {
        let statement = select(&users(), &Condition::all([]), &[], None, Some(5));

        assert!(statement.sql.ends_with("LIMIT ? OFFSET ?"));
        assert_eq!(statement.args, vec![Value::Integer(-1), Value::Integer(5)]);
    }

    #[test]
    fn test_exists_count_and_delete() {
        let condition = Condition::all([Condition::eq("id", "A")]);

        assert_eq!(
            exists(&users(), &condition).sql,
            r#"SELECT 1 FROM "users" WHERE "id" = ? LIMIT 1"#
        );
        assert_eq!(
            count(&users(), &condition).sql,
            r#"SELECT COUNT(*) FROM "users" WHERE "id" = ?"#
        );
        assert_eq!(
            delete(&users(), &Condition::all([])).sql,
            r#"DELETE FROM "users""#
        );
    }

    #[test]
    fn test_upsert_updates_every_column() {
        let statement = upsert(
            &users(),
            vec![Value::from("A"), Value::from("ada"), Value::Integer(36)],
        );

        assert_eq!(
            statement.sql,
            concat!(
                r#"INSERT INTO "users" ("id", "name", "age") VALUES (?, ?, ?) "#,
                r#"ON CONFLICT ("id") DO UPDATE SET "id" = excluded."id", "#,
                r#""name" = excluded."name", "age" = excluded."age""#
            )
        );
        assert_eq!(statement.args.len(), 3);
    }
}
