//! Turns a batch of row updates into per-row puts.
//!
//! The whole batch is validated before the first write. Writes are not
//! atomic across rows: the first failing put stops the batch and rows
//! already written stay written.

use crate::error::{ConnectorError, Result};
use std::collections::{BTreeMap, HashMap};
use widecol_commons::constants::EMPTY_CELL_VALUE;
use widecol_store::{StoreClient, TableHandle};

/// Row key → qualifier → value. `None` is written as an empty value.
pub type RowUpdates = HashMap<String, HashMap<String, Option<String>>>;

/// One normalized row write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMutation {
    pub key: Vec<u8>,
    pub family: String,
    pub cells: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// Validated, normalized batch for one table and one column family.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    table: String,
    family: String,
    mutations: Vec<RowMutation>,
}

impl MutationBatch {
    /// Validates the inputs and normalizes every row.
    ///
    /// Rows are ordered by key so that writes happen in a deterministic order.
    pub fn build(table: &str, family: &str, updates: &RowUpdates) -> Result<Self> {
        if table.is_empty() {
            return Err(ConnectorError::invalid_argument("table name cannot be empty"));
        }
        if family.is_empty() {
            return Err(ConnectorError::invalid_argument("column family cannot be empty"));
        }
        if updates.keys().any(|key| key.is_empty()) {
            return Err(ConnectorError::invalid_argument("row key cannot be empty"));
        }

        let mut keys: Vec<&String> = updates.keys().collect();
        keys.sort();

        let mut mutations = Vec::with_capacity(keys.len());
        for key in keys {
            let values = &updates[key];
            if values.is_empty() {
                log::debug!("Skipping row {} of table {}: no columns", key, table);
                continue;
            }

            let cells = values
                .iter()
                .map(|(qualifier, value)| {
                    let value = value.as_deref().unwrap_or(EMPTY_CELL_VALUE);
                    (qualifier.as_bytes().to_vec(), value.as_bytes().to_vec())
                })
                .collect();
            mutations.push(RowMutation {
                key: key.as_bytes().to_vec(),
                family: family.to_string(),
                cells,
            });
        }

        Ok(Self {
            table: table.to_string(),
            family: family.to_string(),
            mutations,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn mutations(&self) -> &[RowMutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Issues one put per row through an open handle.
    pub fn apply(&self, client: &dyn StoreClient, handle: &TableHandle) -> Result<()> {
        log::info!("Writing {} rows to table {}", self.len(), self.table);

        for mutation in &self.mutations {
            if log::log_enabled!(log::Level::Debug) {
                let values: BTreeMap<_, _> = mutation
                    .cells
                    .iter()
                    .map(|(q, v)| (String::from_utf8_lossy(q), String::from_utf8_lossy(v)))
                    .collect();
                log::debug!(
                    "Row {} {}: {:?}",
                    String::from_utf8_lossy(&mutation.key),
                    self.family,
                    values
                );
            }
            client.put(handle, &mutation.key, &mutation.family, &mutation.cells)?;
        }
        Ok(())
    }
}
