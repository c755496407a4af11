//! # widecol-commons
//!
//! Shared types used by every widecol crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use widecol_commons::Row;
//! use std::collections::BTreeMap;
//!
//! let mut row = Row::new("r1");
//! let mut info = BTreeMap::new();
//! info.insert("name".to_string(), "jorge".to_string());
//! row.add_column_family("info", info);
//!
//! assert_eq!(row.value("info", "name"), Some("jorge"));
//! ```

pub mod constants;
pub mod row;

pub use row::{ColumnFamilyMap, ColumnMap, Row};
