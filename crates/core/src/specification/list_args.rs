use serde::Serialize;

use super::{limit_of, offset_of, sort_of, SortArg, Specification};
use crate::pagination::PaginationParams;

/// Arguments for `list` and `each`: filters plus sort and paging.
///
/// Positional variants may also appear inside `filters`; the explicit
/// `limit`/`offset` fields take precedence over them, and explicit sort
/// arguments are applied before sort specifications found in `filters`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListArgs<F> {
    pub filters: Vec<Specification<F>>,
    pub sort: Vec<SortArg>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl<F> Default for ListArgs<F> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<F> ListArgs<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds list arguments from a bare specification set.
    pub fn from_specs(specs: impl IntoIterator<Item = Specification<F>>) -> Self {
        Self {
            filters: specs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filters.push(Specification::Filter(filter));
        self
    }

    pub fn sort_by(mut self, arg: SortArg) -> Self {
        self.sort.push(arg);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies a page window (limit and offset) from pagination parameters.
    pub fn paginate(self, params: &PaginationParams) -> Self {
        let params = params.normalize();
        self.limit(params.limit()).offset(params.offset())
    }

    pub fn effective_limit(&self) -> Option<u32> {
        self.limit.or_else(|| limit_of(&self.filters))
    }

    pub fn effective_offset(&self) -> Option<u32> {
        self.offset.or_else(|| offset_of(&self.filters))
    }

    pub fn effective_sort(&self) -> Vec<SortArg> {
        let mut sort = self.sort.clone();
        sort.extend(sort_of(&self.filters));
        sort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Tag(&'static str);

    #[test]
    fn test_explicit_fields_win_over_specs() {
        let args = ListArgs::from_specs([Specification::limit(1), Specification::offset(9)])
            .filter(Tag("a"))
            .limit(20)
            .offset(40);

        assert_eq!(args.effective_limit(), Some(20));
        assert_eq!(args.effective_offset(), Some(40));
    }

    #[test]
    fn test_specs_used_when_fields_absent() {
        let args: ListArgs<Tag> =
            ListArgs::from_specs([Specification::limit(1), Specification::offset(2)]);

        assert_eq!(args.effective_limit(), Some(1));
        assert_eq!(args.effective_offset(), Some(2));
    }

    #[test]
    fn test_effective_sort_orders_explicit_first() {
        let args: ListArgs<Tag> = ListArgs::from_specs([Specification::sort([SortArg::asc("b")])])
            .sort_by(SortArg::desc("a"));

        assert_eq!(
            args.effective_sort(),
            vec![SortArg::desc("a"), SortArg::asc("b")]
        );
    }

    #[test]
    fn test_paginate_sets_window() {
        let args: ListArgs<Tag> = ListArgs::new().paginate(&PaginationParams::new(3, 10));

        assert_eq!(args.limit, Some(10));
        assert_eq!(args.offset, Some(20));
    }

    #[test]
    fn test_paginate_normalizes_zero_values() {
        let args: ListArgs<Tag> = ListArgs::new().paginate(&PaginationParams {
            page: 0,
            page_size: 0,
        });

        assert_eq!(args.limit, Some(10));
        assert_eq!(args.offset, Some(0));
    }
}
