//! Constants shared between the store, the core and the binary.

/// Reserved RocksDB column family that holds table descriptors.
pub const TABLE_CATALOG_PARTITION: &str = "__widecol_tables";

/// Byte appended to a start key to turn an exclusive upper bound into an inclusive one.
pub const INCLUSIVE_STOP_SUFFIX: u8 = 0x00;

/// Default number of versions kept per cell when a table does not say otherwise.
pub const DEFAULT_MAX_VERSIONS: u32 = 3;

/// Value written for qualifiers whose update carries no value.
pub const EMPTY_CELL_VALUE: &str = "";
