//! Error types for COPY text serialization.
//!
//! Every failure aborts the operation that raised it and is returned to the
//! caller; nothing is retried or swallowed.
//!
//! ## Error Categories
//!
//! - **Configuration**: a reserved string or the buffer capacity is unusable
//! - **Active serializer**: a setting was changed while a transfer is running
//! - **Too many fields**: a row received more fields than the transfer declared
//! - **I/O**: the sink rejected a write or flush
//!
//! ## Examples
//!
//! ```rust
//! use copy_text::{CopyOptions, Error};
//!
//! let err = CopyOptions::new().with_escape("\\\\").validate().unwrap_err();
//! assert!(matches!(err, Error::Configuration(_)));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors raised while building a COPY stream.
#[derive(Debug, Error)]
pub enum Error {
    /// A configured value cannot be used (e.g. a multi-character escape prefix).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A setting was changed while the serializer is bound to a running transfer.
    #[error("Cannot change {0} while a COPY transfer is in progress")]
    ActiveSerializer(&'static str),

    /// A field was added beyond the number of columns declared for the transfer.
    #[error("Too many fields in row: the transfer declares {expected}")]
    TooManyFields { expected: usize },

    /// The sink failed; passed through untouched.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A serde value has no field representation in a COPY row.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use copy_text::Error;
    ///
    /// let err = Error::configuration("escape must be one character");
    /// assert!(err.to_string().contains("escape must be one character"));
    /// ```
    pub fn configuration<T: fmt::Display>(msg: T) -> Self {
        Error::Configuration(msg.to_string())
    }

    pub fn too_many_fields(expected: usize) -> Self {
        Error::TooManyFields { expected }
    }

    /// Creates an unsupported type error for serde values that cannot become a field.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_passes_through() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "socket closed");
        let err: Error = io_err.into();
        match err {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("Expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_messages() {
        assert!(Error::too_many_fields(3).to_string().contains("declares 3"));
        assert!(Error::ActiveSerializer("delimiter")
            .to_string()
            .contains("delimiter"));
    }
}
