use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for Tabby operations.
///
/// Each kind names a category of failure so callers can react to it
/// (for example retry on `ConnectionFailed`, report on `ValidationError`).
///
/// # Examples
///
/// ```rust,ignore
/// use tabby::errors::{TabbyError, ErrorKind, TabbyResult};
///
/// fn example() -> TabbyResult<()> {
///     Err(TabbyError::new("No document found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Connection Errors
    /// The connection address could not be parsed
    InvalidConnectionString,
    /// No store module is registered for the address scheme
    UnsupportedScheme,
    /// The store behind the address could not be opened
    ConnectionFailed,

    // Backend and Store Errors
    /// Error from storage backend
    BackendError,
    /// Store has not been initialized
    StoreNotInitialized,
    /// Store has already been closed
    StoreAlreadyClosed,

    // Record Errors
    /// The requested resource was not found
    NotFound,
    /// The provided ID is invalid
    InvalidId,
    /// The operation is not valid in the current context
    InvalidOperation,

    // Schema Errors
    /// A value could not be cast to the declared field type
    ValidationError,
    /// Error mapping object to/from document
    ObjectMappingError,

    // Query Errors
    /// Error during criteria or projection construction
    FilterError,

    // IO and Encoding Errors
    /// Generic IO error
    IOError,
    /// The disk is full
    DiskFull,
    /// The file was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,
    /// File data is corrupted
    FileCorrupted,
    /// Error encoding or decoding data
    EncodingError,
    /// Invalid data type for operation
    InvalidDataType,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidConnectionString => write!(f, "Invalid connection string"),
            ErrorKind::UnsupportedScheme => write!(f, "Unsupported scheme"),
            ErrorKind::ConnectionFailed => write!(f, "Connection failed"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreNotInitialized => write!(f, "Store not initialized"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::DiskFull => write!(f, "Disk full"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::FileCorrupted => write!(f, "File corrupted"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type of the Tabby client.
///
/// `TabbyError` carries a message, a kind, an optional cause and the
/// backtrace captured when it was created.
///
/// ```rust,ignore
/// use tabby::errors::{TabbyError, ErrorKind};
///
/// let cause = TabbyError::new("disk unplugged", ErrorKind::IOError);
/// let err = TabbyError::new_with_cause("Failed to open store", ErrorKind::ConnectionFailed, cause);
/// assert_eq!(err.kind(), &ErrorKind::ConnectionFailed);
/// ```
#[derive(Clone)]
pub struct TabbyError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<TabbyError>>,
    backtrace: Atomic<Backtrace>,
}

impl TabbyError {
    /// Creates a new `TabbyError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        TabbyError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `TabbyError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: TabbyError) -> Self {
        TabbyError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&TabbyError> {
        self.cause.as_deref()
    }

    /// Returns the innermost error of the cause chain.
    pub fn root_cause(&self) -> &TabbyError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl Display for TabbyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Debug for TabbyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message and kind, then the cause chain; the backtrace only for the innermost error
        match &self.cause {
            Some(cause) => write!(
                f,
                "[{}] {}\nCaused by: {:?}",
                self.error_kind, self.message, cause
            ),
            None => write!(
                f,
                "[{}] {}\n{:?}",
                self.error_kind,
                self.message,
                self.backtrace.read()
            ),
        }
    }
}

impl Error for TabbyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, TabbyError>`, returned by every fallible operation.
pub type TabbyResult<T> = Result<T, TabbyError>;

impl de::Error for TabbyError {
    fn custom<T: Display>(msg: T) -> Self {
        TabbyError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl ser::Error for TabbyError {
    fn custom<T: Display>(msg: T) -> Self {
        TabbyError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::io::Error> for TabbyError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => ErrorKind::FileCorrupted,
            _ => ErrorKind::IOError,
        };
        TabbyError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<std::string::FromUtf8Error> for TabbyError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        TabbyError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::fmt::Error> for TabbyError {
    fn from(err: std::fmt::Error) -> Self {
        TabbyError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<std::num::ParseIntError> for TabbyError {
    fn from(err: std::num::ParseIntError) -> Self {
        TabbyError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<std::num::ParseFloatError> for TabbyError {
    fn from(err: std::num::ParseFloatError) -> Self {
        TabbyError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<String> for TabbyError {
    fn from(msg: String) -> Self {
        TabbyError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for TabbyError {
    fn from(msg: &str) -> Self {
        TabbyError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_error_has_no_cause() {
        let error = TabbyError::new("An error occurred", ErrorKind::IOError);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::IOError);
        assert!(error.cause().is_none());
        assert!(error.source().is_none());
    }

    #[test]
    fn error_with_cause_exposes_chain() {
        let cause = TabbyError::new("socket reset", ErrorKind::IOError);
        let error =
            TabbyError::new_with_cause("Failed to open store", ErrorKind::ConnectionFailed, cause);
        assert_eq!(error.kind(), &ErrorKind::ConnectionFailed);
        assert_eq!(error.cause().map(|c| c.message()), Some("socket reset"));
        assert!(error.source().is_some());
        assert_eq!(error.root_cause().kind(), &ErrorKind::IOError);
    }

    #[test]
    fn display_includes_cause_message() {
        let cause = TabbyError::new("socket reset", ErrorKind::IOError);
        let error =
            TabbyError::new_with_cause("Failed to open store", ErrorKind::ConnectionFailed, cause);
        assert_eq!(format!("{}", error), "Failed to open store: socket reset");
    }

    #[test]
    fn debug_includes_kind_and_cause() {
        let cause = TabbyError::new("socket reset", ErrorKind::IOError);
        let error =
            TabbyError::new_with_cause("Failed to open store", ErrorKind::ConnectionFailed, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("[Connection failed] Failed to open store"));
        assert!(formatted.contains("Caused by:"));
        assert!(formatted.contains("socket reset"));
    }

    #[test]
    fn io_error_kinds_are_mapped() {
        let not_found: TabbyError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert_eq!(not_found.kind(), &ErrorKind::FileNotFound);

        let denied: TabbyError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(denied.kind(), &ErrorKind::PermissionDenied);

        let other: TabbyError = std::io::Error::other("boom").into();
        assert_eq!(other.kind(), &ErrorKind::IOError);
    }

    #[test]
    fn parse_errors_are_invalid_data_type() {
        let int_err: TabbyError = "abc".parse::<i64>().unwrap_err().into();
        assert_eq!(int_err.kind(), &ErrorKind::InvalidDataType);

        let float_err: TabbyError = "abc".parse::<f64>().unwrap_err().into();
        assert_eq!(float_err.kind(), &ErrorKind::InvalidDataType);
    }

    #[test]
    fn serde_custom_errors_are_mapping_errors() {
        let error = <TabbyError as de::Error>::custom("bad field");
        assert_eq!(error.kind(), &ErrorKind::ObjectMappingError);
        let error = <TabbyError as ser::Error>::custom("bad field");
        assert_eq!(error.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::UnsupportedScheme.to_string(), "Unsupported scheme");
        assert_eq!(ErrorKind::StoreAlreadyClosed.to_string(), "Store already closed");
        assert_eq!(ErrorKind::ValidationError.to_string(), "Validation error");
    }
}
