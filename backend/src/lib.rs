//! widecol command-line front end.
//!
//! This library exposes the binary's modules for testing.

pub mod args;
pub mod commands;
pub mod store;
