/// Database Module
///
/// This module provides the connector's database layer, organized into
/// focused submodules:
///
/// - **Connection Handle** (`connection.rs`): session lifecycle, query
///   execution, charset and transaction control
/// - **Result Handle** (`result.rs`): row iteration, column access and
///   the lazily built field-metadata cache
/// - **Connection Target** (`target.rs`): host specifier parsing
/// - **Escaping** (`escape.rs`): context-free statement escaping
///
/// The free functions below are the factory namespace the connector
/// exposes alongside the two handle types: `connect`, the context-free
/// escape helpers, and the `version_info` report.
///
/// ## Error Handling
///
/// All operations use the crate-wide `MyconnError` type; see
/// `core::error` for the taxonomy.
pub mod connection;
pub mod escape;
pub mod result;
pub mod target;

pub use connection::{Connection, QueryOutcome};
pub use escape::{escape_bytes, escape_string};
pub use result::ResultSet;
pub use target::{ConnectionTarget, DEFAULT_PORT};

use crate::core::error::Result;
use crate::driver::Driver;

/// Opens a connection through the given driver.
///
/// Convenience wrapper over [`Connection::connect`].
pub fn connect(
    driver: &dyn Driver,
    spec: Option<&str>,
    user: Option<&str>,
    password: Option<&str>,
) -> Result<Connection> {
    Connection::connect(driver, spec, user, password)
}

/// Multi-line client build and protocol version report.
pub fn version_info(driver: &dyn Driver) -> String {
    format!(
        "CLIENT_VERSION   = {}\nPROTOCOL_VERSION = {}\n",
        driver.client_version(),
        driver.protocol_version()
    )
}
