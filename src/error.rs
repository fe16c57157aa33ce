//! Custom error types and result handling for Shoko operations.
//!
//! All operations return a [`Result<T>`] which is a type alias for `std::result::Result<T, Error>`.
//! The variants follow the failure kinds of the library: configuration problems are
//! fatal at startup, malformed metadata aborts a build, a missing EPUB aborts an open,
//! and filesystem failures abort the operation that hit them.
//!
use std::path::PathBuf;

/// Type alias for Results with Shoko errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Shoko operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// JSON serialization errors not tied to a persisted document
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Blocking task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    /// Malformed or inconsistent configuration (tag collision, missing key, ...)
    #[error("Configuration error: {0}")]
    Config(String),
    /// A persisted document exists but could not be parsed
    #[error("Failed to parse '{path:?}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for input that cannot be converted (e.g., an empty text chapter)
    #[error("Invalid value: {0}")]
    Value(String),
    /// Error for resources that couldn't be found (e.g., an EPUB, a grouping)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

// A library that fails to build is a configuration problem.
impl From<crate::library::LibraryBuilderError> for Error {
    fn from(error: crate::library::LibraryBuilderError) -> Self {
        Error::Config(error.to_string())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
