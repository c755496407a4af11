//! Flattens scanned rows into [`Row`]s.

use crate::error::Result;
use widecol_commons::{ColumnFamilyMap, ColumnMap, Row};
use widecol_store::{RawRow, ScanDirection};
use widecol_store::storage_trait::Result as StoreResult;

/// Collapses one raw row: every cell resolves to the last version delivered.
pub fn materialize_row(raw: RawRow) -> Row {
    let key = String::from_utf8_lossy(&raw.key).into_owned();
    let mut families = ColumnFamilyMap::new();

    for (family, qualifiers) in raw.families {
        let mut columns = ColumnMap::new();
        for (qualifier, versions) in qualifiers {
            let mut resolved = None;
            for (_timestamp, value) in versions {
                resolved = Some(value);
            }
            if let Some(value) = resolved {
                columns.insert(
                    String::from_utf8_lossy(&qualifier).into_owned(),
                    String::from_utf8_lossy(&value).into_owned(),
                );
            }
        }
        families.insert(String::from_utf8_lossy(&family).into_owned(), columns);
    }

    Row::with_families(key, families)
}

/// Drains a scan into rows.
///
/// For a reversed request the buffered rows are reversed and then cut to
/// `limit` (when non-zero). The first store error aborts with no partial result.
pub fn materialize<I>(rows: I, limit: usize, direction: ScanDirection) -> Result<Vec<Row>>
where
    I: IntoIterator<Item = StoreResult<RawRow>>,
{
    let mut out = Vec::new();
    for raw in rows {
        out.push(materialize_row(raw?));
    }

    if direction.is_reversed() {
        out.reverse();
        if limit > 0 {
            out.truncate(limit);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use widecol_store::StoreError;

    fn raw(key: &str) -> RawRow {
        let mut row = RawRow::new(key);
        row.add_cell("info", "name", 1, key);
        row
    }

    fn keys(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(Row::key).collect()
    }

    #[test]
    fn test_last_version_wins() {
        let mut row = RawRow::new("r1");
        row.add_cell("info", "name", 100, "old")
            .add_cell("info", "name", 200, "new")
            .add_cell("meta", "owner", 5, "ops");

        let row = materialize_row(row);
        assert_eq!(row.key(), "r1");
        assert_eq!(row.value("info", "name"), Some("new"));
        assert_eq!(row.value("meta", "owner"), Some("ops"));
    }

    #[test]
    fn test_lossy_key_decoding() {
        let row = materialize_row(RawRow::new(vec![b'r', 0xFF]));
        assert_eq!(row.key(), "r\u{FFFD}");
    }

    #[test]
    fn test_forward_keeps_delivery_order_and_ignores_limit() {
        let rows = materialize(
            vec![Ok(raw("a")), Ok(raw("b")), Ok(raw("c"))],
            2,
            ScanDirection::Forward,
        )
        .unwrap();
        assert_eq!(keys(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reverse_then_truncate() {
        let source: Vec<_> = ["k1", "k2", "k3", "k4", "k5"].into_iter().map(|k| Ok(raw(k))).collect();
        let rows = materialize(source, 3, ScanDirection::Reverse).unwrap();
        assert_eq!(keys(&rows), vec!["k5", "k4", "k3"]);
    }

    #[test]
    fn test_reverse_unlimited() {
        let rows = materialize(vec![Ok(raw("a")), Ok(raw("b"))], 0, ScanDirection::Reverse).unwrap();
        assert_eq!(keys(&rows), vec!["b", "a"]);
    }

    #[test]
    fn test_store_error_propagates() {
        let source = vec![Ok(raw("a")), Err(StoreError::Io("disk".into())), Ok(raw("c"))];
        let err = materialize(source, 0, ScanDirection::Forward).unwrap_err();
        assert_eq!(err, ConnectorError::Store(StoreError::Io("disk".into())));
    }
}
