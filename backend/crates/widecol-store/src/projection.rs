//! Column projection: restrict a scan to selected (family, qualifier) pairs.

use crate::cells::{FamilyCells, RawRow};
use std::collections::{BTreeMap, BTreeSet};

/// Family → qualifiers to return.
///
/// A family mapped to an empty qualifier set returns the whole family.
/// An empty projection returns every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    columns: BTreeMap<String, BTreeSet<String>>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a projection from a family → qualifier list mapping.
    pub fn from_columns<I, F, Q>(columns: I) -> Self
    where
        I: IntoIterator<Item = (F, Vec<Q>)>,
        F: Into<String>,
        Q: Into<String>,
    {
        let mut projection = Self::new();
        for (family, qualifiers) in columns {
            let family = family.into();
            for qualifier in qualifiers {
                projection.add_column(family.clone(), qualifier);
            }
        }
        projection
    }

    /// Adds one column.
    pub fn add_column(&mut self, family: impl Into<String>, qualifier: impl Into<String>) -> &mut Self {
        self.columns
            .entry(family.into())
            .or_default()
            .insert(qualifier.into());
        self
    }

    /// Adds a whole family.
    pub fn add_family(&mut self, family: impl Into<String>) -> &mut Self {
        self.columns.insert(family.into(), BTreeSet::new());
        self
    }

    pub fn contains(&self, family: &str, qualifier: &str) -> bool {
        match self.columns.get(family) {
            Some(qualifiers) => qualifiers.is_empty() || qualifiers.contains(qualifier),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of explicitly listed (family, qualifier) pairs.
    pub fn column_count(&self) -> usize {
        self.columns.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.columns.iter().map(|(f, q)| (f.as_str(), q))
    }

    /// Drops every cell outside the projection. Empty families are removed.
    pub fn apply(&self, row: RawRow) -> RawRow {
        if self.is_empty() {
            return row;
        }
        let mut families = FamilyCells::new();
        for (family, qualifiers) in row.families {
            let Some(wanted) = self.columns.get(&*String::from_utf8_lossy(&family)) else {
                continue;
            };
            let kept: BTreeMap<_, _> = qualifiers
                .into_iter()
                .filter(|(qualifier, _)| {
                    wanted.is_empty() || wanted.contains(&*String::from_utf8_lossy(qualifier))
                })
                .collect();
            if !kept.is_empty() {
                families.insert(family, kept);
            }
        }
        RawRow::with_families(row.key, families)
    }
}
