//! Driver abstraction layer for the connector.
//!
//! This module defines the trait surface through which the connector
//! consumes an underlying wire driver. The handshake, authentication and
//! packet framing all live behind these traits; the connector only deals
//! in sessions, result sets and the metadata accessors below.
//!
//! A driver is three objects:
//! - [`Driver`] — the connector factory, plus client build information
//!   for the version report.
//! - [`Session`] — one authenticated server session. Owned exclusively by
//!   the `Connection` handle and released when the box is dropped.
//! - [`Rows`] — one native result set. Owned exclusively by the
//!   `ResultSet` handle, independently of the session that produced it.
//!
//! The in-tree [`mock`] driver is a scripted in-memory implementation used
//! by the test suite; real wire drivers implement the same traits out of
//! tree.

use crate::core::db::ConnectionTarget;

pub mod mock;

/// An error reported by the underlying driver.
///
/// The message is the driver's own error text and is surfaced to callers
/// verbatim; `code` is the accompanying numeric error code (0 when the
/// driver has none).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    /// Numeric error code from the driver/server
    pub code: u32,
    /// Driver error text, passed through unmodified
    pub message: String,
}

impl DriverError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        DriverError {
            code,
            message: message.into(),
        }
    }
}

/// Result-set retrieval policy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Transfer the full result set into client memory before the call
    /// returns. The session is immediately free for further statements.
    Buffered,
    /// Transfer rows lazily, one per fetch. The session is busy until the
    /// result is drained or closed; no other statement may be issued on it
    /// in the meantime.
    Streamed,
}

/// Connector factory and client build information.
pub trait Driver {
    /// Opens a session against the given target.
    ///
    /// A `None` host and socket means the driver's built-in default
    /// target. Handshake or authentication failure is reported as a
    /// [`DriverError`] carrying the driver's message.
    fn connect(
        &self,
        target: &ConnectionTarget,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Box<dyn Session>, DriverError>;

    /// Version string of the client-side driver build.
    fn client_version(&self) -> String;

    /// Wire protocol version the driver speaks.
    fn protocol_version(&self) -> u32;
}

/// One authenticated server session.
///
/// All calls block until the underlying driver call returns. Sessions are
/// single-owner and not thread-safe; the connector serializes access by
/// taking `&mut self` on every operation that talks to the server.
pub trait Session {
    /// Executes a statement and hands back its native result set.
    ///
    /// `Ok(None)` means the statement produced no columns (DML/DDL); the
    /// caller reads [`Session::affected_rows`] instead. A statement that
    /// should have produced columns but yielded no result set is a driver
    /// error, not `Ok(None)`.
    fn execute(
        &mut self,
        statement: &str,
        mode: FetchMode,
    ) -> Result<Option<Box<dyn Rows>>, DriverError>;

    /// Switches the session's active schema.
    fn select_db(&mut self, name: &str) -> Result<(), DriverError>;

    /// Applies a connection character set through the driver's native
    /// charset call (the pre-4.1 path; newer servers are configured with
    /// `SET` statements instead).
    fn set_charset(&mut self, charset: &str) -> Result<(), DriverError>;

    /// Escapes raw bytes for textual embedding, honoring the session's
    /// negotiated character set.
    fn escape(&self, raw: &[u8]) -> Vec<u8>;

    /// Rolls back the current transaction.
    fn rollback(&mut self) -> Result<(), DriverError>;

    /// Error text of the most recent failed call, empty if none.
    fn last_error(&self) -> String;

    /// Error code of the most recent failed call, 0 if none.
    fn last_error_code(&self) -> u32;

    /// Row id generated by the last insert statement.
    fn last_insert_id(&self) -> u64;

    /// Rows changed/deleted/inserted by the last statement.
    fn affected_rows(&self) -> u64;

    /// Numeric server version, `major * 10000 + minor * 100 + patch`.
    fn server_version(&self) -> u64;

    /// Human-readable server version string.
    fn server_info(&self) -> String;
}

/// One native result set.
///
/// Row values are nullable byte-strings: `None` is SQL NULL, `Some` is
/// the raw column bytes (possibly empty). Column order is the statement's
/// column order throughout.
pub trait Rows {
    /// Number of columns in the result set.
    fn column_count(&self) -> usize;

    /// Column names, in column order. Called once per result handle to
    /// build the field-index cache.
    fn column_names(&self) -> Vec<String>;

    /// Fetches the next row, or `None` when the set is exhausted.
    /// Exhaustion is a normal outcome, not an error.
    fn fetch_row(&mut self) -> Option<Vec<Option<Vec<u8>>>>;

    /// Repositions the cursor to a 0-based row offset. Meaningful for
    /// buffered result sets only; streamed behavior is driver-defined.
    fn seek(&mut self, offset: u64);

    /// Total number of rows. Meaningful for buffered result sets only.
    fn row_count(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display_is_verbatim_message() {
        let err = DriverError::new(1064, "You have an error in your SQL syntax");
        assert_eq!(err.to_string(), "You have an error in your SQL syntax");
    }

    #[test]
    fn test_fetch_mode_equality() {
        assert_eq!(FetchMode::Buffered, FetchMode::Buffered);
        assert_ne!(FetchMode::Buffered, FetchMode::Streamed);
    }
}
