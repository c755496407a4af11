//! Versioned cell layout shared by every store implementation.
//!
//! ```text
//! FamilyCells:  family → qualifier → timestamp (ascending) → value
//! ```
//!
//! `BTreeMap` keeps each level sorted, so versions are always delivered
//! oldest first.

use crate::storage_trait::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamp → value, ascending by timestamp.
pub type VersionMap = BTreeMap<u64, Vec<u8>>;

/// Qualifier → versions.
pub type QualifierMap = BTreeMap<Vec<u8>, VersionMap>;

/// Family → qualifiers.
pub type FamilyCells = BTreeMap<Vec<u8>, QualifierMap>;

/// One row as delivered by a store scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub key: Vec<u8>,
    pub families: FamilyCells,
}

impl RawRow {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            families: FamilyCells::new(),
        }
    }

    pub fn with_families(key: impl Into<Vec<u8>>, families: FamilyCells) -> Self {
        Self {
            key: key.into(),
            families,
        }
    }

    /// Adds one version of one cell.
    pub fn add_cell(
        &mut self,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: u64,
        value: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.families
            .entry(family.into())
            .or_default()
            .entry(qualifier.into())
            .or_default()
            .insert(timestamp, value.into());
        self
    }

    /// Value of the last delivered version of a cell.
    pub fn latest_value(&self, family: &[u8], qualifier: &[u8]) -> Option<&[u8]> {
        self.families
            .get(family)?
            .get(qualifier)?
            .values()
            .last()
            .map(Vec::as_slice)
    }

    /// True when the row carries no cell versions at all.
    pub fn is_empty(&self) -> bool {
        self.families
            .values()
            .all(|qualifiers| qualifiers.values().all(|versions| versions.is_empty()))
    }

    /// Total number of stored versions across all cells.
    pub fn version_count(&self) -> usize {
        self.families
            .values()
            .flat_map(|qualifiers| qualifiers.values())
            .map(|versions| versions.len())
            .sum()
    }
}

/// Writes `cells` under `family` at `timestamp`, keeping at most
/// `max_versions` versions per qualifier (oldest dropped first).
///
/// A stored version may carry a timestamp ahead of `timestamp` (a write
/// burst or clock step-back before a reopen). The new value is then stamped
/// just after the newest stored version, so it always becomes the latest.
pub fn apply_put(
    row: &mut FamilyCells,
    family: &str,
    cells: &BTreeMap<Vec<u8>, Vec<u8>>,
    timestamp: u64,
    max_versions: u32,
) {
    let qualifiers = row.entry(family.as_bytes().to_vec()).or_default();
    let keep = max_versions.max(1) as usize;
    for (qualifier, value) in cells {
        let versions = qualifiers.entry(qualifier.clone()).or_default();
        let stamp = match versions.keys().next_back() {
            Some(&newest) => timestamp.max(newest.saturating_add(1)),
            None => timestamp,
        };
        versions.insert(stamp, value.clone());
        while versions.len() > keep {
            versions.pop_first();
        }
    }
}

/// Encode a stored row using bincode.
pub fn encode_row(row: &FamilyCells) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(row, bincode::config::standard())
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a stored row using bincode.
pub fn decode_row(bytes: &[u8]) -> Result<FamilyCells> {
    let (row, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(row)
}

/// Hands out strictly increasing millisecond timestamps.
///
/// Two writes in the same millisecond still get distinct versions.
#[derive(Debug, Default)]
pub struct TimestampOracle {
    last: AtomicU64,
}

impl TimestampOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pairs: &[(&str, &str)]) -> BTreeMap<Vec<u8>, Vec<u8>> {
        pairs
            .iter()
            .map(|(q, v)| (q.as_bytes().to_vec(), v.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn test_latest_value_is_last_version() {
        let mut row = RawRow::new("r1");
        row.add_cell("info", "name", 10, "old")
            .add_cell("info", "name", 20, "new");

        assert_eq!(row.latest_value(b"info", b"name"), Some(&b"new"[..]));
        assert_eq!(row.latest_value(b"info", b"missing"), None);
        assert_eq!(row.version_count(), 2);
    }

    #[test]
    fn test_apply_put_trims_oldest_versions() {
        let mut row = FamilyCells::new();
        apply_put(&mut row, "info", &cells(&[("name", "v1")]), 1, 2);
        apply_put(&mut row, "info", &cells(&[("name", "v2")]), 2, 2);
        apply_put(&mut row, "info", &cells(&[("name", "v3")]), 3, 2);

        let versions = &row[&b"info".to_vec()][&b"name".to_vec()];
        let kept: Vec<_> = versions.keys().copied().collect();
        assert_eq!(kept, vec![2, 3]);
        assert_eq!(versions[&3], b"v3".to_vec());
    }

    #[test]
    fn test_apply_put_newer_than_future_stored_version() {
        let mut row = FamilyCells::new();
        apply_put(&mut row, "info", &cells(&[("name", "burst")]), 20_000, 1);
        // Clock behind the stored version
        apply_put(&mut row, "info", &cells(&[("name", "final")]), 1_000, 1);

        let versions = &row[&b"info".to_vec()][&b"name".to_vec()];
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[&20_001], b"final".to_vec());

        let mut row = FamilyCells::new();
        apply_put(&mut row, "info", &cells(&[("name", "burst")]), 20_000, 3);
        apply_put(&mut row, "info", &cells(&[("name", "final")]), 1_000, 3);
        let raw = RawRow::with_families("r1", row);
        assert_eq!(raw.latest_value(b"info", b"name"), Some(&b"final"[..]));
        assert_eq!(raw.version_count(), 2);
    }

    #[test]
    fn test_apply_put_keeps_other_qualifiers() {
        let mut row = FamilyCells::new();
        apply_put(&mut row, "info", &cells(&[("name", "jorge")]), 1, 1);
        apply_put(&mut row, "info", &cells(&[("lastname", "garcia")]), 2, 1);

        let raw = RawRow::with_families("r1", row);
        assert_eq!(raw.latest_value(b"info", b"name"), Some(&b"jorge"[..]));
        assert_eq!(raw.latest_value(b"info", b"lastname"), Some(&b"garcia"[..]));
    }

    #[test]
    fn test_encode_decode_stored_row() {
        let mut row = FamilyCells::new();
        apply_put(&mut row, "info", &cells(&[("name", "jorge")]), 42, 3);

        let bytes = encode_row(&row).unwrap();
        assert_eq!(decode_row(&bytes).unwrap(), row);
        assert!(decode_row(&[0xFF, 0xFF, 0xFF]).is_err());
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let oracle = TimestampOracle::new();
        let mut previous = oracle.next();
        for _ in 0..1000 {
            let ts = oracle.next();
            assert!(ts > previous);
            previous = ts;
        }
    }
}
