/// Connection Handle Module
///
/// A `Connection` owns one authenticated driver session and is the only
/// way to execute statements. The handle has two states, open and
/// closed; the native session is released exactly once, by the first
/// `close()` call or by `Drop`, whichever comes first. Every operation
/// on a closed handle reports an argument error, never a driver error
/// and never a panic.
use std::fmt;

use tracing::debug;

use crate::core::db::result::ResultSet;
use crate::core::db::target::ConnectionTarget;
use crate::core::error::{MyconnError, Result};
use crate::driver::{Driver, FetchMode, Session};

/// Servers reporting a version above this get the connection charset
/// applied through session variables, with the client charset pinned to
/// binary so result bytes pass through unconverted.
const CHARSET_SESSION_VARS_VERSION: u64 = 41_000;

/// Servers reporting a version above this additionally get strict SQL
/// mode cleared after a charset change.
const SQL_MODE_RESET_VERSION: u64 = 50_001;

/// Minimum server version with rollback support.
const ROLLBACK_MIN_VERSION: u64 = 40_100;

/// Outcome of executing a statement.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The statement produced columns; iterate the result set
    Rows(ResultSet),
    /// The statement produced no columns; the affected-row count
    Affected(u64),
}

impl QueryOutcome {
    /// The result set, if the statement produced one.
    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            QueryOutcome::Affected(_) => None,
        }
    }

    /// The affected-row count, if the statement produced no columns.
    pub fn affected(&self) -> Option<u64> {
        match self {
            QueryOutcome::Rows(_) => None,
            QueryOutcome::Affected(count) => Some(*count),
        }
    }
}

/// Handle over one database session.
pub struct Connection {
    /// Native session; `None` is the closed state
    session: Option<Box<dyn Session>>,
}

impl Connection {
    /// Opens a connection.
    ///
    /// `spec` is the host specifier (`[host][":"port][":"socketPath]`);
    /// `None` means the driver's default target. Handshake failure
    /// surfaces the driver's error message verbatim.
    pub fn connect(
        driver: &dyn Driver,
        spec: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Connection> {
        let target = ConnectionTarget::parse(spec);
        debug!("opening connection to {:?}", target);
        let session = driver.connect(&target, user, password)?;
        Ok(Connection {
            session: Some(session),
        })
    }

    fn session(&self) -> Result<&dyn Session> {
        self.session
            .as_deref()
            .ok_or_else(|| MyconnError::Argument("connection is closed".to_string()))
    }

    fn session_mut(&mut self) -> Result<&mut (dyn Session + 'static)> {
        self.session
            .as_deref_mut()
            .ok_or_else(|| MyconnError::Argument("connection is closed".to_string()))
    }

    /// Executes a statement with a buffered result set: all rows are
    /// transferred before this returns, and the connection is free for
    /// further statements immediately.
    pub fn query(&mut self, statement: &str) -> Result<QueryOutcome> {
        self.run_query(statement, FetchMode::Buffered)
    }

    /// Executes a statement with a streamed result set: rows transfer
    /// one `advance()` at a time, and the connection stays busy until
    /// the result is drained or closed.
    pub fn unbuffered_query(&mut self, statement: &str) -> Result<QueryOutcome> {
        self.run_query(statement, FetchMode::Streamed)
    }

    fn run_query(&mut self, statement: &str, mode: FetchMode) -> Result<QueryOutcome> {
        let session = self.session_mut()?;
        match session.execute(statement, mode)? {
            Some(rows) => Ok(QueryOutcome::Rows(ResultSet::new(rows))),
            None => Ok(QueryOutcome::Affected(session.affected_rows())),
        }
    }

    /// Switches the active schema.
    pub fn select_db(&mut self, name: &str) -> Result<()> {
        self.session_mut()?.select_db(name)?;
        Ok(())
    }

    /// Applies a connection character set.
    ///
    /// Hyphens are stripped from the name first, so `"utf-8"` and
    /// `"utf8"` are the same charset. Two independent version gates
    /// follow: servers above `CHARSET_SESSION_VARS_VERSION` get the
    /// charset as a `SET` statement with the client charset pinned to
    /// binary, older servers get the driver's native charset call; and
    /// servers above `SQL_MODE_RESET_VERSION` additionally get
    /// `SET sql_mode=''`.
    pub fn set_charset(&mut self, charset: &str) -> Result<()> {
        let normalized: String = charset.chars().filter(|&c| c != '-').collect();
        let session = self.session_mut()?;
        let version = session.server_version();

        if version > CHARSET_SESSION_VARS_VERSION {
            let statement = format!(
                "SET character_set_connection={0}, character_set_results={0}, character_set_client=binary",
                normalized
            );
            session.execute(&statement, FetchMode::Buffered)?;
        } else {
            session.set_charset(&normalized)?;
        }

        if version > SQL_MODE_RESET_VERSION {
            session.execute("SET sql_mode=''", FetchMode::Buffered)?;
        }

        Ok(())
    }

    /// Escapes raw bytes per the session's negotiated character set.
    pub fn escape_bytes(&self, raw: &[u8]) -> Result<Vec<u8>> {
        Ok(self.session()?.escape(raw))
    }

    /// Escapes UTF-8 text per the session's negotiated character set.
    pub fn escape_string(&self, raw: &str) -> Result<String> {
        let escaped = self.session()?.escape(raw.as_bytes());
        Ok(match String::from_utf8(escaped) {
            Ok(escaped) => escaped,
            Err(err) => String::from_utf8_lossy(&err.into_bytes()).into_owned(),
        })
    }

    /// Rolls back the current transaction.
    ///
    /// Servers below `ROLLBACK_MIN_VERSION` report a fixed unsupported
    /// error without a driver call.
    pub fn rollback(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        if session.server_version() < ROLLBACK_MIN_VERSION {
            return Err(MyconnError::Unsupported("rollback"));
        }
        session.rollback()?;
        Ok(())
    }

    /// Error text of the most recent failed driver call.
    pub fn last_error(&self) -> Result<String> {
        Ok(self.session()?.last_error())
    }

    /// Error code of the most recent failed driver call.
    pub fn last_errno(&self) -> Result<u32> {
        Ok(self.session()?.last_error_code())
    }

    /// Row id generated by the last insert statement.
    pub fn insert_id(&self) -> Result<u64> {
        Ok(self.session()?.last_insert_id())
    }

    /// Rows changed by the last statement.
    pub fn affected_rows(&self) -> Result<u64> {
        Ok(self.session()?.affected_rows())
    }

    /// Numeric server version (`major * 10000 + minor * 100 + patch`).
    pub fn server_version(&self) -> Result<u64> {
        Ok(self.session()?.server_version())
    }

    /// Human-readable server version string.
    pub fn server_info(&self) -> Result<String> {
        Ok(self.session()?.server_info())
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    /// Releases the native session.
    ///
    /// Idempotent: the first call returns `true`, later calls return
    /// `false` without error. Also invoked from `Drop`, so an
    /// unclosed handle is released when it goes out of scope.
    pub fn close(&mut self) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        debug!("connection closed");
        true
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_closed() {
            write!(f, "mysql connection (closed)")
        } else {
            write!(f, "mysql connection ({:p})", self as *const Connection)
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .finish()
    }
}
