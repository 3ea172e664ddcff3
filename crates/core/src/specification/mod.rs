//! Specifications: filter, paging and sort directives passed to repositories.
//!
//! A [`Specification`] is a closed union over the positional directives
//! (`Limit`, `Offset`, `Sort`) and a per-entity filter type `F`. Repositories
//! fold the `Filter` variants into a single predicate with logical AND and
//! consume the positional variants only when paginating.

mod list_args;
mod sort;

use serde::Serialize;

pub use list_args::ListArgs;
pub use sort::{SortArg, SortDirection, SortParams, SortParamsError};

/// A single repository directive.
///
/// `F` is the entity-specific filter family (e.g. `UserFilter::Email(..)`).
/// Repositories only react to the filter variants their translator knows
/// about; anything else is ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Specification<F> {
    Limit(u32),
    Offset(u32),
    Sort(Vec<SortArg>),
    Filter(F),
}

impl<F> Specification<F> {
    pub fn limit(limit: u32) -> Self {
        Self::Limit(limit)
    }

    pub fn offset(offset: u32) -> Self {
        Self::Offset(offset)
    }

    pub fn sort(args: impl IntoIterator<Item = SortArg>) -> Self {
        Self::Sort(args.into_iter().collect())
    }

    pub fn filter(filter: F) -> Self {
        Self::Filter(filter)
    }

    /// Returns true for the variants that contribute to the predicate.
    pub fn is_filter(&self) -> bool {
        matches!(self, Self::Filter(_))
    }
}

/// Iterates the filter payloads of a specification set, in order.
pub fn filters<F>(specs: &[Specification<F>]) -> impl Iterator<Item = &F> {
    specs.iter().filter_map(|spec| match spec {
        Specification::Filter(filter) => Some(filter),
        _ => None,
    })
}

/// The last `Limit` in a specification set, if any.
pub fn limit_of<F>(specs: &[Specification<F>]) -> Option<u32> {
    specs.iter().rev().find_map(|spec| match spec {
        Specification::Limit(limit) => Some(*limit),
        _ => None,
    })
}

/// The last `Offset` in a specification set, if any.
pub fn offset_of<F>(specs: &[Specification<F>]) -> Option<u32> {
    specs.iter().rev().find_map(|spec| match spec {
        Specification::Offset(offset) => Some(*offset),
        _ => None,
    })
}

/// All sort arguments of a specification set, concatenated in order.
pub fn sort_of<F>(specs: &[Specification<F>]) -> Vec<SortArg> {
    specs
        .iter()
        .filter_map(|spec| match spec {
            Specification::Sort(args) => Some(args.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect()
}
