// Core infrastructure modules
pub mod core;

// Driver seam and the in-tree scripted driver
pub mod driver;

#[cfg(test)]
mod integration_tests;

// Flat re-exports of the public surface
pub use crate::core::db::{
    connect, escape_bytes, escape_string, version_info, Connection, ConnectionTarget,
    QueryOutcome, ResultSet, DEFAULT_PORT,
};
pub use crate::core::{MyconnError, Result};
