/// Myconn Error Module
///
/// This module defines the error types shared across the connector.
/// It separates programmer misuse of handles from failures reported by
/// the underlying wire driver, so callers can always tell "you used a
/// closed handle" apart from "the server rejected the query".
use crate::driver::DriverError;
use thiserror::Error;

/// Error type for all connector operations.
///
/// The three variants map the failure channels of the connector:
/// - `Argument` — misuse of a handle (e.g. operating on a closed
///   connection or result). These are caller bugs, reported immediately.
/// - `Driver` — failures surfaced by the underlying driver (handshake
///   refused, query rejected). The driver's message is carried verbatim.
/// - `Unsupported` — operations the connected server is too old to
///   support; reported without touching the driver.
///
/// Normal negative outcomes (row exhaustion, closing an already-closed
/// handle) are not errors and never appear here; they are plain `false`
/// or absent values on the success path.
#[derive(Error, Debug)]
pub enum MyconnError {
    /// Programmer misuse of a handle or argument contract violation
    #[error("Argument error: {0}")]
    Argument(String),

    /// Errors reported by the underlying wire driver
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Operations the connected server version does not support
    #[error("Error: Unsupported {0}.")]
    Unsupported(&'static str),
}

/// Type alias for Result to use MyconnError as the error type.
pub type Result<T> = std::result::Result<T, MyconnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let arg_err = MyconnError::Argument("connection is closed".to_string());
        assert_eq!(arg_err.to_string(), "Argument error: connection is closed");

        let drv_err = MyconnError::Driver(DriverError::new(1045, "Access denied for user"));
        assert!(drv_err.to_string().contains("Access denied for user"));

        let unsup_err = MyconnError::Unsupported("rollback");
        assert_eq!(unsup_err.to_string(), "Error: Unsupported rollback.");
    }

    #[test]
    fn test_driver_error_conversion() {
        let drv = DriverError::new(2006, "MySQL server has gone away");
        let err: MyconnError = drv.into();
        match err {
            MyconnError::Driver(e) => {
                assert_eq!(e.code, 2006);
                assert_eq!(e.message, "MySQL server has gone away");
            }
            _ => panic!("Expected Driver error"),
        }
    }
}
