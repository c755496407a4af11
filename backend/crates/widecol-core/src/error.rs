// Error types module
use thiserror::Error;
use widecol_store::StoreError;

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Errors surfaced by the connector operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// Rejected before any store call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification for callers that switch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    StoreUnavailable,
    StoreIo,
}

impl ConnectorError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ConnectorError::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectorError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ConnectorError::Store(e) if e.is_unavailable() => ErrorKind::StoreUnavailable,
            ConnectorError::Store(_) => ErrorKind::StoreIo,
        }
    }

    /// The underlying store error, if the store caused the failure.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ConnectorError::Store(e) => Some(e),
            ConnectorError::InvalidArgument(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ConnectorError::invalid_argument("table name cannot be empty").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            ConnectorError::from(StoreError::Unavailable("zk down".into())).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            ConnectorError::from(StoreError::TableNotFound("t".into())).kind(),
            ErrorKind::StoreIo
        );
    }

    #[test]
    fn test_store_error_kept_verbatim() {
        let err = ConnectorError::from(StoreError::Io("disk full".into()));
        assert_eq!(err.store_error(), Some(&StoreError::Io("disk full".into())));
        assert_eq!(err.to_string(), "Store error: I/O error: disk full");
    }
}
