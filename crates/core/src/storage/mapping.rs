use crate::query::{Condition, Value};
use crate::specification::{filters, Specification};

use super::Result;

/// Bidirectional mapping between an entity and its backend row, plus the
/// translation of the entity's filter family into predicates.
///
/// Implementations must round-trip: `entity(row(e)) == e`, and
/// `scan(values(r))` must rebuild `r`. `values` yields column values in the
/// order the table schema declares its columns.
pub trait RowMapping: Send + Sync + 'static {
    type Entity: Send + Sync + 'static;
    type Filter: Send + Sync + 'static;
    type Row: Send + 'static;

    fn row(&self, entity: &Self::Entity) -> Self::Row;

    fn entity(&self, row: Self::Row) -> Result<Self::Entity>;

    fn values(&self, row: &Self::Row) -> Vec<Value>;

    fn scan(&self, values: Vec<Value>) -> Result<Self::Row>;

    /// Translates one filter into a predicate. Filters the backend cannot
    /// express return `None` and are ignored.
    fn filter(&self, filter: &Self::Filter) -> Option<Condition>;

    /// Column values for an entity, in schema order.
    fn encode(&self, entity: &Self::Entity) -> Vec<Value> {
        self.values(&self.row(entity))
    }

    /// Scans a fetched row and converts it into an entity.
    fn decode(&self, values: Vec<Value>) -> Result<Self::Entity> {
        self.entity(self.scan(values)?)
    }

    /// AND-folds the filter variants of a specification set.
    fn condition(&self, specs: &[Specification<Self::Filter>]) -> Condition {
        Condition::all(filters(specs).filter_map(|filter| self.filter(filter)))
    }
}
