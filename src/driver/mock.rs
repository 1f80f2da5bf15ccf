//! Scripted in-memory driver.
//!
//! This is the in-tree implementation of the driver traits: a
//! deterministic stand-in that serves canned outcomes keyed by statement
//! text, with no server and no I/O. The test suite runs entirely against
//! it, and embedders can use it wherever a protocol-free fixture is
//! handier than a live server.
//!
//! Every call that reaches the driver is recorded in a log shared between
//! the driver value and the sessions it opens, so a test can hand a
//! `MockDriver` to the connector and afterwards assert the exact
//! statement stream the connector produced.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::db::escape::escape_bytes;
use crate::core::db::ConnectionTarget;

use super::{Driver, DriverError, FetchMode, Rows, Session};

/// Scripted outcome for one statement.
#[derive(Debug, Clone)]
enum Outcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Option<Vec<u8>>>>,
    },
    Affected {
        count: u64,
        insert_id: u64,
    },
    Error(DriverError),
}

/// Target and credentials a session was opened with.
#[derive(Debug, Clone)]
pub struct RecordedConnect {
    pub target: ConnectionTarget,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Record of everything the connector asked the driver to do.
#[derive(Debug, Default)]
pub struct MockLog {
    /// Statements passed to `execute`, in order
    pub statements: Vec<String>,
    /// Charset names passed to the native `set_charset` call
    pub charset_calls: Vec<String>,
    /// Schema names passed to `select_db`
    pub selected_dbs: Vec<String>,
    /// Number of native rollback calls
    pub rollbacks: usize,
    /// Number of times a result set's column names were read
    pub column_name_reads: usize,
    /// Sessions opened, with their target and credentials
    pub connects: Vec<RecordedConnect>,
}

/// Scripted in-memory driver.
///
/// Build one with the `with_*` methods, hand it to the connector, and
/// inspect the shared log afterwards. Unscripted statements succeed with
/// zero affected rows, so statements the connector generates internally
/// (charset and sql_mode `SET`s) pass through without setup.
pub struct MockDriver {
    server_version: u64,
    server_info: String,
    connect_error: Option<DriverError>,
    script: HashMap<String, Outcome>,
    log: Arc<Mutex<MockLog>>,
}

impl MockDriver {
    /// Creates a driver that reports a modern (5.7-era) server.
    pub fn new() -> Self {
        MockDriver {
            server_version: 50731,
            server_info: "5.7.31-mock".to_string(),
            connect_error: None,
            script: HashMap::new(),
            log: Arc::new(Mutex::new(MockLog::default())),
        }
    }

    /// Sets the numeric server version sessions will report
    /// (`major * 10000 + minor * 100 + patch`).
    pub fn with_server_version(mut self, version: u64) -> Self {
        self.server_version = version;
        self
    }

    /// Sets the human-readable server version string.
    pub fn with_server_info(mut self, info: &str) -> Self {
        self.server_info = info.to_string();
        self
    }

    /// Scripts a result set for a statement. Row values are UTF-8 cell
    /// text, with `None` standing for SQL NULL.
    pub fn with_result(
        mut self,
        statement: &str,
        columns: &[&str],
        rows: Vec<Vec<Option<&str>>>,
    ) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.map(|text| text.as_bytes().to_vec()))
                    .collect()
            })
            .collect();
        self.script
            .insert(statement.to_string(), Outcome::Rows { columns, rows });
        self
    }

    /// Scripts a no-column outcome (DML/DDL) for a statement.
    pub fn with_affected(mut self, statement: &str, count: u64, insert_id: u64) -> Self {
        self.script
            .insert(statement.to_string(), Outcome::Affected { count, insert_id });
        self
    }

    /// Scripts a driver error for a statement.
    pub fn with_error(mut self, statement: &str, code: u32, message: &str) -> Self {
        self.script.insert(
            statement.to_string(),
            Outcome::Error(DriverError::new(code, message)),
        );
        self
    }

    /// Makes every `connect` attempt fail with the given message.
    pub fn fail_connect(mut self, code: u32, message: &str) -> Self {
        self.connect_error = Some(DriverError::new(code, message));
        self
    }

    /// Statements executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().statements.clone()
    }

    /// Charset names passed to the native charset call, in order.
    pub fn charset_calls(&self) -> Vec<String> {
        self.log.lock().unwrap().charset_calls.clone()
    }

    /// Schema names selected so far, in order.
    pub fn selected_dbs(&self) -> Vec<String> {
        self.log.lock().unwrap().selected_dbs.clone()
    }

    /// Number of native rollback calls made so far.
    pub fn rollback_count(&self) -> usize {
        self.log.lock().unwrap().rollbacks
    }

    /// Number of times column names were read off a result set.
    pub fn column_name_reads(&self) -> usize {
        self.log.lock().unwrap().column_name_reads
    }

    /// Sessions opened so far, with target and credentials.
    pub fn connects(&self) -> Vec<RecordedConnect> {
        self.log.lock().unwrap().connects.clone()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        MockDriver::new()
    }
}

impl Driver for MockDriver {
    fn connect(
        &self,
        target: &ConnectionTarget,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Box<dyn Session>, DriverError> {
        if let Some(err) = &self.connect_error {
            return Err(err.clone());
        }
        self.log.lock().unwrap().connects.push(RecordedConnect {
            target: target.clone(),
            user: user.map(str::to_string),
            password: password.map(str::to_string),
        });
        Ok(Box::new(MockSession {
            script: self.script.clone(),
            log: Arc::clone(&self.log),
            server_version: self.server_version,
            server_info: self.server_info.clone(),
            last_error: String::new(),
            last_error_code: 0,
            last_insert_id: 0,
            affected_rows: 0,
        }))
    }

    fn client_version(&self) -> String {
        "myconn-mock/0.1.0".to_string()
    }

    fn protocol_version(&self) -> u32 {
        10
    }
}

struct MockSession {
    script: HashMap<String, Outcome>,
    log: Arc<Mutex<MockLog>>,
    server_version: u64,
    server_info: String,
    last_error: String,
    last_error_code: u32,
    last_insert_id: u64,
    affected_rows: u64,
}

impl Session for MockSession {
    fn execute(
        &mut self,
        statement: &str,
        _mode: FetchMode,
    ) -> Result<Option<Box<dyn Rows>>, DriverError> {
        self.log
            .lock()
            .unwrap()
            .statements
            .push(statement.to_string());
        match self.script.get(statement) {
            Some(Outcome::Rows { columns, rows }) => {
                self.last_error.clear();
                self.last_error_code = 0;
                self.affected_rows = rows.len() as u64;
                Ok(Some(Box::new(MockRows {
                    columns: columns.clone(),
                    rows: rows.clone(),
                    cursor: 0,
                    log: Arc::clone(&self.log),
                })))
            }
            Some(Outcome::Affected { count, insert_id }) => {
                self.last_error.clear();
                self.last_error_code = 0;
                self.affected_rows = *count;
                self.last_insert_id = *insert_id;
                Ok(None)
            }
            Some(Outcome::Error(err)) => {
                self.last_error = err.message.clone();
                self.last_error_code = err.code;
                Err(err.clone())
            }
            None => {
                self.last_error.clear();
                self.last_error_code = 0;
                self.affected_rows = 0;
                Ok(None)
            }
        }
    }

    fn select_db(&mut self, name: &str) -> Result<(), DriverError> {
        self.log.lock().unwrap().selected_dbs.push(name.to_string());
        Ok(())
    }

    fn set_charset(&mut self, charset: &str) -> Result<(), DriverError> {
        self.log
            .lock()
            .unwrap()
            .charset_calls
            .push(charset.to_string());
        Ok(())
    }

    fn escape(&self, raw: &[u8]) -> Vec<u8> {
        // The mock speaks a binary-safe charset; the generic rules apply.
        escape_bytes(raw)
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.log.lock().unwrap().rollbacks += 1;
        Ok(())
    }

    fn last_error(&self) -> String {
        self.last_error.clone()
    }

    fn last_error_code(&self) -> u32 {
        self.last_error_code
    }

    fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn server_version(&self) -> u64 {
        self.server_version
    }

    fn server_info(&self) -> String {
        self.server_info.clone()
    }
}

struct MockRows {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    cursor: usize,
    log: Arc<Mutex<MockLog>>,
}

impl Rows for MockRows {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.log.lock().unwrap().column_name_reads += 1;
        self.columns.clone()
    }

    fn fetch_row(&mut self) -> Option<Vec<Option<Vec<u8>>>> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        row
    }

    fn seek(&mut self, offset: u64) {
        self.cursor = offset as usize;
    }

    fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }
}
