//! Scan descriptors and the cursor every store runs its rows through.

use crate::cells::RawRow;
use crate::predicate::Predicate;
use crate::projection::Projection;
use crate::storage_trait::Result;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

/// Direction requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanDirection {
    #[default]
    Forward,
    Reverse,
}

impl ScanDirection {
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            ScanDirection::Reverse
        } else {
            ScanDirection::Forward
        }
    }

    pub fn is_reversed(&self) -> bool {
        matches!(self, ScanDirection::Reverse)
    }
}

/// Everything a store needs to execute one range scan.
#[derive(Clone, Default)]
pub struct ScanDescriptor {
    /// Inclusive lower bound. `None` starts at the beginning of the keyspace.
    pub start_row: Option<Vec<u8>>,
    /// Exclusive upper bound. `None` runs to the end of the keyspace.
    pub stop_row: Option<Vec<u8>>,
    pub predicate: Option<Arc<dyn Predicate>>,
    pub projection: Option<Projection>,
    /// Requested row count, 0 = unlimited. Not interpreted by stores.
    pub limit: usize,
    /// Requested direction. Stores always scan forward.
    pub direction: ScanDirection,
}

impl ScanDescriptor {
    /// A scan over the whole table.
    pub fn full() -> Self {
        Self::default()
    }

    /// Key bounds suitable for `BTreeMap::range`.
    pub fn key_bounds(&self) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
        let lower = match &self.start_row {
            Some(start) => Bound::Included(start.clone()),
            None => Bound::Unbounded,
        };
        let upper = match &self.stop_row {
            Some(stop) => Bound::Excluded(stop.clone()),
            None => Bound::Unbounded,
        };
        (lower, upper)
    }

    /// True when the bounds cannot contain any key.
    pub fn is_empty_range(&self) -> bool {
        match (&self.start_row, &self.stop_row) {
            (Some(start), Some(stop)) => start >= stop,
            (None, Some(stop)) => stop.is_empty(),
            _ => false,
        }
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        let after_start = self
            .start_row
            .as_deref()
            .map_or(true, |start| key >= start);
        let before_stop = self.stop_row.as_deref().map_or(true, |stop| key < stop);
        after_start && before_stop
    }
}

impl fmt::Debug for ScanDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanDescriptor")
            .field(
                "start_row",
                &self.start_row.as_deref().map(String::from_utf8_lossy),
            )
            .field(
                "stop_row",
                &self.stop_row.as_deref().map(String::from_utf8_lossy),
            )
            .field("predicate", &self.predicate)
            .field("projection", &self.projection)
            .field("limit", &self.limit)
            .field("direction", &self.direction)
            .finish()
    }
}

/// Applies projection, predicate and the predicate's row limit to a stream
/// of rows already restricted to the descriptor's key range.
///
/// Stops for good after the first error.
pub struct ScanCursor<I> {
    inner: I,
    projection: Option<Projection>,
    predicate: Option<Arc<dyn Predicate>>,
    remaining: Option<usize>,
    done: bool,
}

impl<I> ScanCursor<I>
where
    I: Iterator<Item = Result<RawRow>>,
{
    pub fn new(inner: I, descriptor: &ScanDescriptor) -> Self {
        let remaining = descriptor.predicate.as_ref().and_then(|p| p.row_limit());
        Self {
            inner,
            projection: descriptor.projection.clone().filter(|p| !p.is_empty()),
            predicate: descriptor.predicate.clone(),
            remaining,
            done: false,
        }
    }
}

impl<I> Iterator for ScanCursor<I>
where
    I: Iterator<Item = Result<RawRow>>,
{
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == Some(0) {
            return None;
        }

        loop {
            let row = match self.inner.next()? {
                Ok(row) => row,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let row = match &self.projection {
                Some(projection) => projection.apply(row),
                None => row,
            };
            if row.is_empty() {
                continue;
            }

            if let Some(predicate) = &self.predicate {
                if !predicate.accept(&row) {
                    continue;
                }
            }

            if let Some(left) = self.remaining.as_mut() {
                *left -= 1;
            }
            return Some(Ok(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{PageFilter, PrefixFilter, PredicateList};
    use crate::storage_trait::StoreError;

    fn rows(keys: &[&str]) -> Vec<Result<RawRow>> {
        keys.iter()
            .map(|k| {
                let mut row = RawRow::new(*k);
                row.add_cell("info", "name", 1, *k);
                Ok(row)
            })
            .collect()
    }

    fn keys(results: Vec<Result<RawRow>>) -> Vec<String> {
        results
            .into_iter()
            .map(|r| String::from_utf8(r.unwrap().key).unwrap())
            .collect()
    }

    #[test]
    fn test_bounds() {
        let descriptor = ScanDescriptor {
            start_row: Some(b"b".to_vec()),
            stop_row: Some(b"d".to_vec()),
            ..Default::default()
        };
        assert!(descriptor.contains_key(b"b"));
        assert!(descriptor.contains_key(b"c"));
        assert!(!descriptor.contains_key(b"d"));
        assert!(!descriptor.contains_key(b"a"));
        assert!(!descriptor.is_empty_range());

        let inverted = ScanDescriptor {
            start_row: Some(b"d".to_vec()),
            stop_row: Some(b"b".to_vec()),
            ..Default::default()
        };
        assert!(inverted.is_empty_range());
    }

    #[test]
    fn test_cursor_applies_page_limit() {
        let descriptor = ScanDescriptor {
            predicate: Some(Arc::new(PageFilter::new(2))),
            ..Default::default()
        };
        let cursor = ScanCursor::new(rows(&["a", "b", "c"]).into_iter(), &descriptor);
        assert_eq!(keys(cursor.collect()), vec!["a", "b"]);
    }

    #[test]
    fn test_cursor_limit_counts_accepted_rows_only() {
        let mut list = PredicateList::new();
        list.add(Arc::new(PrefixFilter::new("u")))
            .add(Arc::new(PageFilter::new(2)));
        let descriptor = ScanDescriptor {
            predicate: Some(Arc::new(list)),
            ..Default::default()
        };
        let cursor = ScanCursor::new(rows(&["a", "u1", "b", "u2", "u3"]).into_iter(), &descriptor);
        assert_eq!(keys(cursor.collect()), vec!["u1", "u2"]);
    }

    #[test]
    fn test_cursor_skips_rows_emptied_by_projection() {
        let mut projection = Projection::new();
        projection.add_column("meta", "owner");
        let mut source = rows(&["a", "b"]);
        if let Some(Ok(row)) = source.get_mut(1) {
            row.add_cell("meta", "owner", 1, "ops");
        }
        let descriptor = ScanDescriptor {
            projection: Some(projection),
            ..Default::default()
        };
        let cursor = ScanCursor::new(source.into_iter(), &descriptor);
        assert_eq!(keys(cursor.collect()), vec!["b"]);
    }

    #[test]
    fn test_cursor_stops_after_error() {
        let source = vec![
            rows(&["a"]).pop().unwrap(),
            Err(StoreError::Io("disk".into())),
            rows(&["c"]).pop().unwrap(),
        ];
        let mut cursor = ScanCursor::new(source.into_iter(), &ScanDescriptor::full());
        assert!(cursor.next().unwrap().is_ok());
        assert!(cursor.next().unwrap().is_err());
        assert!(cursor.next().is_none());
    }
}
