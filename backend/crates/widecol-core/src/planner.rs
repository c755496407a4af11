//! Translates a selection request into a forward range scan.
//!
//! Stores only scan forward. A reversed request with a start key is planned
//! as a forward scan from the beginning of the keyspace up to and including
//! the start key; the materializer then reverses and trims the buffered rows.

use crate::error::{ConnectorError, Result};
use std::sync::Arc;
use widecol_commons::constants::INCLUSIVE_STOP_SUFFIX;
use widecol_store::{PageFilter, Predicate, PredicateList, Projection, ScanDescriptor, ScanDirection};

/// Declarative selection over one table.
#[derive(Debug, Clone, Default)]
pub struct SelectRequest {
    pub table: String,
    pub predicate: Option<Arc<dyn Predicate>>,
    pub projection: Option<Projection>,
    /// Row key to start from. Empty is the same as absent.
    pub start_key: Option<String>,
    /// Maximum rows to return, 0 = unlimited. Negative values are rejected.
    pub limit: i64,
    pub reversed: bool,
}

impl SelectRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn with_predicate(mut self, predicate: Arc<dyn Predicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_start_key(mut self, start_key: impl Into<String>) -> Self {
        self.start_key = Some(start_key.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Checks the request before anything touches the store.
    pub fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(ConnectorError::invalid_argument("table name cannot be empty"));
        }
        if self.limit < 0 {
            return Err(ConnectorError::invalid_argument(format!(
                "limit must not be negative, got {}",
                self.limit
            )));
        }
        Ok(())
    }

    fn effective_start_key(&self) -> Option<&[u8]> {
        self.start_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(str::as_bytes)
    }
}

/// Builds the scan descriptor for a request. Performs no I/O.
pub fn plan(request: &SelectRequest) -> Result<ScanDescriptor> {
    request.validate()?;

    let limit = request.limit as usize;
    let mut descriptor = ScanDescriptor {
        limit,
        direction: ScanDirection::from_reversed(request.reversed),
        ..Default::default()
    };

    match (request.effective_start_key(), request.reversed) {
        (Some(start), true) => {
            let mut stop = Vec::with_capacity(start.len() + 1);
            stop.extend_from_slice(start);
            stop.push(INCLUSIVE_STOP_SUFFIX);
            descriptor.stop_row = Some(stop);
        }
        (Some(start), false) => descriptor.start_row = Some(start.to_vec()),
        (None, _) => {}
    }

    let mut predicates = PredicateList::new();
    if let Some(predicate) = &request.predicate {
        predicates.add(Arc::clone(predicate));
    }
    // A page limit on a reversed scan would cut rows from the wrong end
    if limit > 0 && !request.reversed {
        predicates.add(Arc::new(PageFilter::new(limit)));
    }
    if !predicates.is_empty() {
        descriptor.predicate = Some(Arc::new(predicates));
    }

    descriptor.projection = request
        .projection
        .as_ref()
        .filter(|projection| !projection.is_empty())
        .cloned();

    log::debug!(
        "Planned scan of {}: start={:?} stop={:?} limit={} direction={:?}",
        request.table,
        descriptor.start_row.as_deref().map(String::from_utf8_lossy),
        descriptor.stop_row.as_deref().map(String::from_utf8_lossy),
        descriptor.limit,
        descriptor.direction
    );
    Ok(descriptor)
}
