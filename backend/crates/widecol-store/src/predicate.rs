//! Row predicates evaluated by the store during a scan.
//!
//! Callers hand pre-built predicates to the core, which only composes them
//! (AND with a page limit) and passes them through. The store evaluates
//! [`Predicate::accept`] on every row of the range, after projection, and
//! stops once [`Predicate::row_limit`] rows were accepted.

use crate::cells::RawRow;
use std::fmt;
use std::sync::Arc;

/// A store-evaluated row filter.
pub trait Predicate: Send + Sync + fmt::Debug {
    /// Whether the row is part of the result.
    fn accept(&self, row: &RawRow) -> bool;

    /// Maximum number of accepted rows the scan may return.
    fn row_limit(&self) -> Option<usize> {
        None
    }
}

/// Returns at most `page_size` rows, counted from the start of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFilter {
    page_size: usize,
}

impl PageFilter {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Predicate for PageFilter {
    fn accept(&self, _row: &RawRow) -> bool {
        true
    }

    fn row_limit(&self) -> Option<usize> {
        Some(self.page_size)
    }
}

/// Conjunction of predicates: a row passes when every member accepts it.
#[derive(Debug, Clone, Default)]
pub struct PredicateList {
    predicates: Vec<Arc<dyn Predicate>>,
}

impl PredicateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, predicate: Arc<dyn Predicate>) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Arc<dyn Predicate>] {
        &self.predicates
    }
}

impl Predicate for PredicateList {
    fn accept(&self, row: &RawRow) -> bool {
        self.predicates.iter().all(|p| p.accept(row))
    }

    fn row_limit(&self) -> Option<usize> {
        self.predicates.iter().filter_map(|p| p.row_limit()).min()
    }
}

/// Accepts rows whose key starts with a byte prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFilter {
    prefix: Vec<u8>,
}

impl PrefixFilter {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Predicate for PrefixFilter {
    fn accept(&self, row: &RawRow) -> bool {
        row.key.starts_with(&self.prefix)
    }
}

/// Accepts rows where the latest version of one cell equals a value.
///
/// Rows without the cell pass unless `filter_if_missing` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleColumnValueFilter {
    family: Vec<u8>,
    qualifier: Vec<u8>,
    value: Vec<u8>,
    filter_if_missing: bool,
}

impl SingleColumnValueFilter {
    pub fn new(
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            value: value.into(),
            filter_if_missing: false,
        }
    }

    pub fn filter_if_missing(mut self, filter_if_missing: bool) -> Self {
        self.filter_if_missing = filter_if_missing;
        self
    }
}

impl Predicate for SingleColumnValueFilter {
    fn accept(&self, row: &RawRow) -> bool {
        match row.latest_value(&self.family, &self.qualifier) {
            Some(value) => value == self.value.as_slice(),
            None => !self.filter_if_missing,
        }
    }
}
