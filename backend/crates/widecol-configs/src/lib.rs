//! widecol-configs
//!
//! Connector configuration types and loader for widecol.

pub mod config;

pub use config::*;
pub use config::defaults;
