use std::cmp::Ordering;

use super::{like_matches, Value};

/// A predicate tree over named columns.
///
/// `And(vec![])` is the empty predicate and matches every row.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    Ne(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    In(String, Vec<Value>),
    Like(String, String),
    IsNull(String),
    IsNotNull(String),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(column.into(), value.into())
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(column.into(), value.into())
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte(column.into(), value.into())
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(column.into(), value.into())
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte(column.into(), value.into())
    }

    pub fn is_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like(column.into(), pattern.into())
    }

    /// Conjunction of all given conditions.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    /// Disjunction of all given conditions.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    /// True when the condition constrains nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::And(parts) => parts.iter().all(Condition::is_empty),
            _ => false,
        }
    }

    /// Evaluates the condition against a row with SQL semantics: any
    /// comparison involving NULL (or an unknown column) is false.
    pub fn evaluate<'a, L>(&self, lookup: &L) -> bool
    where
        L: Fn(&str) -> Option<&'a Value>,
    {
        let compare = |column: &str, value: &Value, accept: fn(Ordering) -> bool| {
            lookup(column)
                .and_then(|actual| actual.sql_cmp(value))
                .is_some_and(accept)
        };

        match self {
            Condition::Eq(c, v) => compare(c, v, Ordering::is_eq),
            Condition::Ne(c, v) => compare(c, v, Ordering::is_ne),
            Condition::Lt(c, v) => compare(c, v, Ordering::is_lt),
            Condition::Lte(c, v) => compare(c, v, Ordering::is_le),
            Condition::Gt(c, v) => compare(c, v, Ordering::is_gt),
            Condition::Gte(c, v) => compare(c, v, Ordering::is_ge),
            Condition::In(c, values) => values.iter().any(|v| compare(c, v, Ordering::is_eq)),
            Condition::Like(c, pattern) => lookup(c)
                .and_then(Value::as_text)
                .is_some_and(|text| like_matches(pattern, text)),
            Condition::IsNull(c) => lookup(c).is_none_or(Value::is_null),
            Condition::IsNotNull(c) => lookup(c).is_some_and(|v| !v.is_null()),
            Condition::And(parts) => parts.iter().all(|p| p.evaluate(lookup)),
            Condition::Or(parts) => parts.iter().any(|p| p.evaluate(lookup)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row() -> HashMap<&'static str, Value> {
        HashMap::from([
            ("id", Value::from("A")),
            ("name", Value::from("Ada Lovelace")),
            ("age", Value::from(36)),
            ("nickname", Value::Null),
        ])
    }

    fn eval(condition: &Condition) -> bool {
        let row = row();
        condition.evaluate(&|column: &str| row.get(column))
    }

    #[test]
    fn test_empty_and_matches_everything() {
        let condition = Condition::all([]);
        assert!(condition.is_empty());
        assert!(eval(&condition));
    }

    #[test]
    fn test_nested_empty_is_empty() {
        assert!(Condition::all([Condition::all([])]).is_empty());
        assert!(!Condition::any([]).is_empty());
    }

    #[test]
    fn test_comparisons() {
        assert!(eval(&Condition::eq("id", "A")));
        assert!(!eval(&Condition::eq("id", "B")));
        assert!(eval(&Condition::ne("id", "B")));
        assert!(eval(&Condition::gt("age", 30)));
        assert!(eval(&Condition::gte("age", 36)));
        assert!(eval(&Condition::lt("age", 40)));
        assert!(!eval(&Condition::lte("age", 35)));
    }

    #[test]
    fn test_null_comparisons_are_false() {
        assert!(!eval(&Condition::eq("nickname", Value::Null)));
        assert!(!eval(&Condition::ne("nickname", "x")));
        assert!(eval(&Condition::IsNull("nickname".to_string())));
        assert!(!eval(&Condition::IsNotNull("nickname".to_string())));
    }

    #[test]
    fn test_unknown_column_behaves_as_null() {
        assert!(!eval(&Condition::eq("missing", "x")));
        assert!(eval(&Condition::IsNull("missing".to_string())));
    }

    #[test]
    fn test_in_and_like() {
        assert!(eval(&Condition::is_in("id", ["B", "A"])));
        assert!(!eval(&Condition::is_in("id", Vec::<&str>::new())));
        assert!(eval(&Condition::like("name", "ada%")));
        assert!(!eval(&Condition::like("age", "3%")));
    }

    #[test]
    fn test_boolean_composition() {
        let both = Condition::all([Condition::eq("id", "A"), Condition::gt("age", 40)]);
        let either = Condition::any([Condition::eq("id", "A"), Condition::gt("age", 40)]);
        assert!(!eval(&both));
        assert!(eval(&either));
    }

    #[test]
    fn test_order_of_conjuncts_does_not_matter() {
        let a = Condition::all([Condition::eq("id", "A"), Condition::like("name", "%Love%")]);
        let b = Condition::all([Condition::like("name", "%Love%"), Condition::eq("id", "A")]);
        assert_eq!(eval(&a), eval(&b));
    }
}
