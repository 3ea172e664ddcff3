//! DDL derived from table schemas.
//!
//! Migrations are out of scope; this only creates a table exactly as a
//! [`TableSchema`] declares it, which is what the binary and the tests need.

use keystone_core::storage::TableSchema;

use super::query::quote;

/// `CREATE TABLE IF NOT EXISTS` statement for a schema.
///
/// The primary key column gets `PRIMARY KEY`; declared types are copied
/// verbatim so the catalog reports them back unchanged.
pub fn create_table_sql(schema: &TableSchema) -> String {
    let columns = schema
        .columns()
        .iter()
        .map(|column| {
            let mut definition = format!("{} {}", quote(&column.name), column.sql_type);
            if column.name == schema.primary_key() {
                definition.push_str(" PRIMARY KEY");
            }
            definition
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({columns})",
        quote(schema.table())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let schema = TableSchema::new("users", "id")
            .column("id", "TEXT")
            .column("age", "INTEGER");

        assert_eq!(
            create_table_sql(&schema),
            r#"CREATE TABLE IF NOT EXISTS "users" ("id" TEXT PRIMARY KEY, "age" INTEGER)"#
        );
    }
}
