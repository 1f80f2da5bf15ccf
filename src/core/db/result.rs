/// Result Handle Module
///
/// A `ResultSet` owns one native result set obtained from a query and
/// walks it row by row. It is owned independently of the connection that
/// produced it: closing the connection does not close outstanding result
/// sets, and each must be released exactly once, either explicitly or
/// when the handle is dropped.
///
/// The state machine is Open → (iterating) → Closed. After `close()`,
/// every operation except another `close()` reports an argument error.
///
/// Row data is valid only between one successful `advance()` and the
/// next; accessors lend `&[u8]` borrows tied to the handle, so the
/// borrow checker enforces that window.
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::core::error::{MyconnError, Result};
use crate::driver::Rows;

/// Handle over one native result set.
pub struct ResultSet {
    /// Native resource; `None` is the closed state
    rows: Option<Box<dyn Rows>>,
    /// Column count, captured at creation
    column_count: usize,
    /// Current row, populated by `advance`
    current: Option<Vec<Option<Vec<u8>>>>,
    /// Name → 1-based column index, built at most once per handle
    field_index: OnceCell<HashMap<String, usize>>,
}

impl ResultSet {
    pub(crate) fn new(rows: Box<dyn Rows>) -> Self {
        let column_count = rows.column_count();
        ResultSet {
            rows: Some(rows),
            column_count,
            current: None,
            field_index: OnceCell::new(),
        }
    }

    fn rows(&self) -> Result<&dyn Rows> {
        self.rows
            .as_deref()
            .ok_or_else(|| MyconnError::Argument("result is closed".to_string()))
    }

    fn rows_mut(&mut self) -> Result<&mut (dyn Rows + 'static)> {
        self.rows
            .as_deref_mut()
            .ok_or_else(|| MyconnError::Argument("result is closed".to_string()))
    }

    /// Fetches the next row.
    ///
    /// Returns `Ok(true)` when a row was fetched and `Ok(false)` on
    /// exhaustion, which clears the current row. Exhaustion is a normal
    /// outcome; the only error here is using a closed handle.
    pub fn advance(&mut self) -> Result<bool> {
        let fetched = self.rows_mut()?.fetch_row();
        let advanced = fetched.is_some();
        self.current = fetched;
        Ok(advanced)
    }

    /// The full current row in column order, or `None` when no row is
    /// current. Cells are `None` for SQL NULL — distinct from `Some`
    /// with empty bytes.
    pub fn row(&self) -> Result<Option<&[Option<Vec<u8>>]>> {
        self.rows()?;
        Ok(self.current.as_deref())
    }

    /// Column `index` (0-based) of the current row. `None` when there is
    /// no current row, the index is out of range, or the cell is NULL.
    pub fn column(&self, index: usize) -> Result<Option<&[u8]>> {
        self.rows()?;
        match self.current.as_ref() {
            Some(row) if index < self.column_count => {
                Ok(row.get(index).and_then(|cell| cell.as_deref()))
            }
            _ => Ok(None),
        }
    }

    /// Column `name` of the current row, resolved through the field
    /// index. `None` for unknown names, indices outside the column
    /// range, missing current row, or NULL cells.
    pub fn column_by_name(&self, name: &str) -> Result<Option<&[u8]>> {
        self.rows()?;
        if self.current.is_none() {
            return Ok(None);
        }
        let index = self.field_names()?.get(name).copied();
        match index {
            Some(index) if (1..=self.column_count).contains(&index) => self.column(index - 1),
            _ => Ok(None),
        }
    }

    /// The column name → 1-based index map.
    ///
    /// Built lazily on first use — by this call or by named column
    /// access — in a single pass over the driver's column metadata, then
    /// cached for the handle's lifetime. A duplicated column name keeps
    /// the rightmost column's index.
    pub fn field_names(&self) -> Result<&HashMap<String, usize>> {
        let rows = self.rows()?;
        Ok(self.field_index.get_or_init(|| {
            rows.column_names()
                .into_iter()
                .enumerate()
                .map(|(position, name)| (name, position + 1))
                .collect()
        }))
    }

    /// Repositions the cursor to a 0-based row offset.
    ///
    /// Meaningful for buffered results only; on a streamed result the
    /// behavior is whatever the driver does (a known limitation, not
    /// guarded here).
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.rows_mut()?.seek(offset);
        Ok(())
    }

    /// Total row count. Meaningful for buffered results only.
    pub fn size(&self) -> Result<u64> {
        Ok(self.rows()?.row_count())
    }

    /// Number of columns in the result set.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_closed(&self) -> bool {
        self.rows.is_none()
    }

    /// Releases the native result set and the field-index cache.
    ///
    /// Idempotent: the first call returns `true`, later calls return
    /// `false` without error. Also invoked from `Drop`.
    pub fn close(&mut self) -> bool {
        if self.rows.take().is_none() {
            return false;
        }
        trace!("result set closed");
        self.current = None;
        self.field_index.take();
        true
    }
}

impl Drop for ResultSet {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_closed() {
            write!(f, "mysql result (closed)")
        } else {
            write!(f, "mysql result ({:p})", self as *const ResultSet)
        }
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("closed", &self.is_closed())
            .field("column_count", &self.column_count)
            .field("has_current_row", &self.current.is_some())
            .finish()
    }
}
