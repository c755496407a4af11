//! Flattened row model returned by scans.
//!
//! A store row is four levels deep (family → qualifier → timestamp → value).
//! Callers only ever see one resolved value per (family, qualifier) pair,
//! so [`Row`] keeps two levels and uses ordered maps to stay deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Qualifier name → resolved value.
pub type ColumnMap = BTreeMap<String, String>;

/// Column family name → its qualifiers and values.
pub type ColumnFamilyMap = BTreeMap<String, ColumnMap>;

/// A single materialized row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    key: String,
    #[serde(default)]
    column_families: ColumnFamilyMap,
}

impl Row {
    /// Creates an empty row with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            column_families: ColumnFamilyMap::new(),
        }
    }

    /// Creates a row from an already assembled family map.
    pub fn with_families(key: impl Into<String>, column_families: ColumnFamilyMap) -> Self {
        Self {
            key: key.into(),
            column_families,
        }
    }

    /// Returns the row key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the columns of one family, or `None` if the row has no cells in it.
    pub fn column_family(&self, family: &str) -> Option<&ColumnMap> {
        self.column_families.get(family)
    }

    /// Returns the full family map.
    pub fn column_family_map(&self) -> &ColumnFamilyMap {
        &self.column_families
    }

    /// Returns a single resolved value.
    pub fn value(&self, family: &str, qualifier: &str) -> Option<&str> {
        self.column_families
            .get(family)
            .and_then(|columns| columns.get(qualifier))
            .map(String::as_str)
    }

    /// Adds (or replaces) a column family, returning the previous columns if any.
    pub fn add_column_family(
        &mut self,
        family: impl Into<String>,
        columns: ColumnMap,
    ) -> Option<ColumnMap> {
        self.column_families.insert(family.into(), columns)
    }

    /// Removes a column family, returning its columns if it was present.
    pub fn remove_column_family(&mut self, family: &str) -> Option<ColumnMap> {
        self.column_families.remove(family)
    }

    /// Number of families carried by the row.
    pub fn family_count(&self) -> usize {
        self.column_families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column_families.values().all(|columns| columns.is_empty())
    }

    /// Consumes the row and returns its key and family map.
    pub fn into_parts(self) -> (String, ColumnFamilyMap) {
        (self.key, self.column_families)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.key)?;
        let mut first = true;
        for (family, columns) in &self.column_families {
            for (qualifier, value) in columns {
                if !first {
                    write!(f, ",")?;
                }
                first = false;
                write!(f, " {}:{}={}", family, qualifier, value)?;
            }
        }
        write!(f, " }}")
    }
}
