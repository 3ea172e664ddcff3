//! Conversions between `keystone_core` values and SQLite values.

use keystone_core::query::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

/// Converts a bound argument into an owned SQLite value.
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(t) => SqlValue::Text(t.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

/// Converts a fetched column into a `keystone_core` value.
///
/// Text that is not valid UTF-8 is decoded lossily.
pub fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_preserves_storage_class() {
        assert_eq!(to_sql(&Value::Null), SqlValue::Null);
        assert_eq!(to_sql(&Value::Integer(-3)), SqlValue::Integer(-3));
        assert_eq!(to_sql(&Value::Real(1.5)), SqlValue::Real(1.5));
        assert_eq!(
            to_sql(&Value::Text("ada".to_string())),
            SqlValue::Text("ada".to_string())
        );
        assert_eq!(
            to_sql(&Value::Blob(vec![1, 2])),
            SqlValue::Blob(vec![1, 2])
        );
    }

    #[test]
    fn test_from_sql_preserves_storage_class() {
        assert_eq!(from_sql(ValueRef::Null), Value::Null);
        assert_eq!(from_sql(ValueRef::Integer(9)), Value::Integer(9));
        assert_eq!(from_sql(ValueRef::Real(0.25)), Value::Real(0.25));
        assert_eq!(
            from_sql(ValueRef::Text(b"grace")),
            Value::Text("grace".to_string())
        );
        assert_eq!(from_sql(ValueRef::Blob(&[7])), Value::Blob(vec![7]));
    }

    #[test]
    fn test_from_sql_decodes_invalid_utf8_lossily() {
        let value = from_sql(ValueRef::Text(&[0x61, 0xff]));

        assert_eq!(value, Value::Text("a\u{fffd}".to_string()));
    }
}
