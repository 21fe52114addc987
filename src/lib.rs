//! # copy_text
//!
//! A buffered serializer for the text format of PostgreSQL's
//! `COPY ... FROM STDIN` bulk-load protocol.
//!
//! ## What does it produce?
//!
//! A COPY text stream is a sequence of rows. Fields are separated by a
//! delimiter (tab by default), rows end with a separator (line feed), NULL is
//! written as a marker (`\N`), and reserved characters inside values are
//! escaped with a prefix (backslash):
//!
//! ```text
//! 1	abc
//! 2	a\tb
//! 3	\N
//! ```
//!
//! ## Key Features
//!
//! - **Bounded memory**: rows are buffered and handed to any [`std::io::Write`]
//!   sink as the buffer fills, releasing whole rows before whole fields
//! - **Arbitrarily large fields**: the buffer grows by exactly what a field needs
//! - **Typed values**: integers, floats, booleans, dates, timestamps and `bytea`
//!   in the server's canonical text form
//! - **Serde rows**: any `#[derive(Serialize)]` struct or tuple becomes a row
//! - **Configurable**: delimiter, separator, escape prefix and null marker
//!
//! ## Quick Start
//!
//! ### Field by field
//!
//! ```rust
//! use copy_text::{CopyOptions, CopySerializer};
//!
//! let mut ser = CopySerializer::new(Vec::<u8>::new(), 2, CopyOptions::new()).unwrap();
//! ser.add_i32(1).unwrap();
//! ser.add_str("abc").unwrap();
//! ser.end_row().unwrap();
//! ser.add_i32(2).unwrap();
//! ser.end_row().unwrap(); // the missing field is written as NULL
//!
//! let bytes = ser.close().unwrap();
//! assert_eq!(bytes, b"1\tabc\n2\t\\N\n");
//! ```
//!
//! ### Whole rows with serde
//!
//! ```rust
//! use copy_text::to_vec;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Product {
//!     id: u32,
//!     name: String,
//!     price: f64,
//! }
//!
//! let products = vec![
//!     Product { id: 1, name: "Widget".to_string(), price: 9.99 },
//!     Product { id: 2, name: "Gadget".to_string(), price: 14.99 },
//! ];
//!
//! let bytes = to_vec(&products, 3).unwrap();
//! assert_eq!(bytes, b"1\tWidget\t9.99\n2\tGadget\t14.99\n");
//! ```
//!
//! ## Buffering
//!
//! Bytes are handed to the sink only when the buffer runs out of room or on
//! an explicit [`CopySerializer::flush`], [`CopySerializer::flush_rows`] or
//! [`CopySerializer::flush_fields`]. Partial flushes never split a row or
//! field; [`CopySerializer::close`] completes a pending row, flushes
//! everything and returns the sink.
//!
//! ## Logging
//!
//! Buffer growth and flushes are reported through [`tracing`] at `trace` and
//! `debug` level. The crate installs no subscriber.

pub mod buffer;
pub mod error;
pub mod escape;
pub mod format;
pub mod options;
pub mod ser;
pub mod transfer;
pub mod writer;

pub use error::{Error, Result};
pub use escape::EscapeTable;
pub use options::{CopyFormat, CopyOptions, DEFAULT_BUFFER_CAPACITY};
pub use ser::RowSerializer;
pub use transfer::{Detached, TransferState};
pub use writer::CopySerializer;

use serde::Serialize;
use std::io;

/// Serialize a slice of rows to a COPY text byte vector.
///
/// Every row is padded with NULL up to `field_count` fields.
///
/// # Examples
///
/// ```rust
/// use copy_text::to_vec;
///
/// let rows = vec![(1, Some("a")), (2, None)];
/// assert_eq!(to_vec(&rows, 2).unwrap(), b"1\ta\n2\t\\N\n");
/// ```
///
/// # Errors
///
/// Returns an error if a row has more than `field_count` members or contains a
/// value with no field representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(rows: &[T], field_count: usize) -> Result<Vec<u8>>
where
    T: Serialize,
{
    to_vec_with_options(rows, field_count, CopyOptions::default())
}

/// Serialize a slice of rows to a COPY text byte vector with custom options.
///
/// # Examples
///
/// ```rust
/// use copy_text::{to_vec_with_options, CopyOptions};
///
/// let options = CopyOptions::new().with_delimiter(",").with_null("");
/// let rows = vec![("a,b", None::<i32>)];
/// assert_eq!(to_vec_with_options(&rows, 2, options).unwrap(), b"a\\,b,\n");
/// ```
///
/// # Errors
///
/// Returns an error if the options are invalid or a row cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(
    rows: &[T],
    field_count: usize,
    options: CopyOptions,
) -> Result<Vec<u8>>
where
    T: Serialize,
{
    let mut out = Vec::new();
    to_writer_with_options(&mut out, rows, field_count, options)?;
    Ok(out)
}

/// Serialize a slice of rows to a writer in COPY text format.
///
/// The writer is flushed once all rows have been written.
///
/// # Examples
///
/// ```rust
/// use copy_text::to_writer;
///
/// let mut buffer: Vec<u8> = Vec::new();
/// to_writer(&mut buffer, &[(1, true), (2, false)], 2).unwrap();
/// assert_eq!(buffer, b"1\tTRUE\n2\tFALSE\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, rows: &[T], field_count: usize) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    to_writer_with_options(writer, rows, field_count, CopyOptions::default())
}

/// Serialize a slice of rows to a writer in COPY text format with custom options.
///
/// # Errors
///
/// Returns an error if the options are invalid, serialization fails or writing
/// to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(
    writer: W,
    rows: &[T],
    field_count: usize,
    options: CopyOptions,
) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    let mut serializer = CopySerializer::new(writer, field_count, options)?;
    for row in rows {
        serializer.add_row(row)?;
    }
    serializer.close()?;
    Ok(())
}
