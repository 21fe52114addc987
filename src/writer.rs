//! The COPY row writer.
//!
//! [`CopySerializer`] turns fields into the text grammar accepted by
//! `COPY ... FROM STDIN`:
//!
//! ```text
//! row        := field (DELIM field)* SEP
//! field      := escaped-bytes | NULLMARKER
//! escaped    := (byte | ESCAPE escape-seq)*
//! escape-seq := mnemonic-letter | three-octal-digits | literal-byte
//! ```
//!
//! Each `add_*` call appends one field to the current row. Strings are escaped
//! on the way into the buffer; numbers, booleans and timestamps take a
//! non-escaping fast path. [`CopySerializer::end_row`] pads missing trailing
//! fields with the null marker and writes the row separator.
//!
//! ## Examples
//!
//! ```rust
//! use copy_text::{CopyOptions, CopySerializer};
//!
//! let mut ser = CopySerializer::new(Vec::<u8>::new(), 2, CopyOptions::new()).unwrap();
//! ser.add_i32(1).unwrap();
//! ser.add_str("abc").unwrap();
//! ser.end_row().unwrap();
//! ser.add_i32(2).unwrap();
//! ser.add_str("a\tb").unwrap();
//! ser.end_row().unwrap();
//! ser.add_i32(3).unwrap();
//! ser.end_row().unwrap();
//!
//! let bytes = ser.close().unwrap();
//! assert_eq!(bytes, b"1\tabc\n2\ta\\tb\n3\t\\N\n");
//! ```

use crate::buffer::OutputBuffer;
use crate::escape::EscapeTable;
use crate::format;
use crate::options::validate_capacity;
use crate::ser::RowSerializer;
use crate::transfer::{Detached, TransferState};
use crate::{CopyFormat, CopyOptions, Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::debug;

/// Buffered serializer for one COPY text stream.
///
/// Created via [`CopySerializer::new`] with the sink, the number of columns the
/// transfer declares, and the stream options.
pub struct CopySerializer<W: Write> {
    sink: W,
    options: CopyOptions,
    reserved: (char, char, char),
    escapes: Option<EscapeTable>,
    buffer: OutputBuffer,
    field_count: usize,
    at_field: usize,
    rows: u64,
    state: Box<dyn TransferState>,
}

impl<W: Write> CopySerializer<W> {
    /// Creates a serializer writing rows of `field_count` fields to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the options do not validate.
    pub fn new(sink: W, field_count: usize, options: CopyOptions) -> Result<Self> {
        options.validate()?;
        let reserved = options.reserved_chars()?;
        Ok(CopySerializer {
            sink,
            buffer: OutputBuffer::new(options.buffer_capacity),
            options,
            reserved,
            escapes: None,
            field_count,
            at_field: 0,
            rows: 0,
            state: Box::new(Detached),
        })
    }

    /// Binds the serializer to a session's transfer state.
    ///
    /// While `state` reports an active transfer, setters and
    /// [`replace_sink`](Self::replace_sink) fail with [`Error::ActiveSerializer`].
    pub fn attach<S>(&mut self, state: S)
    where
        S: TransferState + 'static,
    {
        self.state = Box::new(state);
    }

    /// Unbinds the serializer from its session.
    pub fn detach(&mut self) {
        self.state = Box::new(Detached);
    }

    /// Whether the owning session currently reports a transfer in progress.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    fn ensure_inactive(&self, what: &'static str) -> Result<()> {
        if self.is_active() {
            return Err(Error::ActiveSerializer(what));
        }
        Ok(())
    }

    pub fn delimiter(&self) -> &str {
        &self.options.delimiter
    }

    pub fn separator(&self) -> &str {
        &self.options.separator
    }

    pub fn escape(&self) -> &str {
        &self.options.escape
    }

    pub fn null(&self) -> &str {
        &self.options.null
    }

    pub fn format(&self) -> CopyFormat {
        self.options.format
    }

    /// Current buffer capacity, including any growth caused by large fields.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of fields each row is padded to.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Number of fields written so far in the row under construction.
    pub fn fields_in_row(&self) -> usize {
        self.at_field
    }

    /// Number of rows completed since creation.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Bytes serialized but not yet handed to the sink.
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    fn reconfigure<F>(&mut self, what: &'static str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut CopyOptions),
    {
        self.ensure_inactive(what)?;
        let mut options = self.options.clone();
        apply(&mut options);
        self.reserved = options.reserved_chars()?;
        debug!("COPY {} changed", what);
        self.options = options;
        self.escapes = None;
        Ok(())
    }

    /// Sets the field delimiter.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ActiveSerializer`] during a transfer and with
    /// [`Error::Configuration`] if `delimiter` is not a single usable character.
    pub fn set_delimiter(&mut self, delimiter: &str) -> Result<()> {
        self.reconfigure("delimiter", |o| o.delimiter = delimiter.to_string())
    }

    /// Sets the row separator. Same failure modes as [`set_delimiter`](Self::set_delimiter).
    pub fn set_separator(&mut self, separator: &str) -> Result<()> {
        self.reconfigure("separator", |o| o.separator = separator.to_string())
    }

    /// Sets the escape prefix. Same failure modes as [`set_delimiter`](Self::set_delimiter).
    pub fn set_escape(&mut self, escape: &str) -> Result<()> {
        self.reconfigure("escape", |o| o.escape = escape.to_string())
    }

    /// Sets the null marker.
    ///
    /// Fails with [`Error::ActiveSerializer`] during a transfer and with
    /// [`Error::Configuration`] if `null` contains the delimiter, separator,
    /// CR or LF.
    pub fn set_null(&mut self, null: &str) -> Result<()> {
        self.reconfigure("null marker", |o| o.null = null.to_string())
    }

    pub fn set_format(&mut self, format: CopyFormat) -> Result<()> {
        self.reconfigure("format", |o| o.format = format)
    }

    /// Swaps the sink, returning the previous one.
    ///
    /// Buffered bytes belong to the previous sink and are flushed to it first.
    pub fn replace_sink(&mut self, sink: W) -> Result<W> {
        self.ensure_inactive("sink")?;
        self.flush()?;
        Ok(std::mem::replace(&mut self.sink, sink))
    }

    /// Resizes the buffer, keeping every buffered byte.
    ///
    /// Shrinking below the buffered data first hands completed rows, then
    /// completed fields, to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a zero capacity, or if the field
    /// under construction alone does not fit in `capacity`.
    pub fn set_buffer_capacity(&mut self, capacity: usize) -> Result<()> {
        validate_capacity(capacity)?;
        if capacity < self.buffer.len() {
            self.buffer.flush_rows(&mut self.sink)?;
        }
        if capacity < self.buffer.len() {
            self.buffer.flush_fields(&mut self.sink)?;
        }
        self.buffer.resize(capacity)?;
        self.options.buffer_capacity = capacity;
        Ok(())
    }

    fn prefix_field(&mut self) -> Result<()> {
        if self.at_field >= self.field_count {
            return Err(Error::too_many_fields(self.field_count));
        }
        if self.at_field > 0 {
            self.buffer
                .append(self.options.delimiter.as_bytes(), &mut self.sink)?;
        }
        Ok(())
    }

    /// Appends one field, escaping reserved characters when `escape` is set.
    ///
    /// Unescaped values must not contain reserved characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFields`] without touching the buffer if the row
    /// is already full, or [`Error::Io`] if making room required a sink write
    /// that failed.
    pub fn add_field(&mut self, value: &str, escape: bool) -> Result<()> {
        self.prefix_field()?;
        if escape {
            let (delimiter, separator, prefix) = self.reserved;
            let table = self
                .escapes
                .get_or_insert_with(|| EscapeTable::new(delimiter, separator, prefix));
            for chunk in table.segments(value) {
                self.buffer.append(chunk, &mut self.sink)?;
            }
        } else {
            self.buffer.append(value.as_bytes(), &mut self.sink)?;
        }
        self.at_field += 1;
        self.buffer.mark_field();
        Ok(())
    }

    /// Appends the null marker as a field.
    pub fn add_null(&mut self) -> Result<()> {
        self.prefix_field()?;
        self.buffer
            .append(self.options.null.as_bytes(), &mut self.sink)?;
        self.at_field += 1;
        self.buffer.mark_field();
        Ok(())
    }

    /// Appends a string field, escaping reserved characters.
    pub fn add_str(&mut self, value: &str) -> Result<()> {
        self.add_field(value, true)
    }

    pub(crate) fn add_display<T: fmt::Display>(&mut self, value: T) -> Result<()> {
        self.add_field(&value.to_string(), false)
    }

    pub fn add_i16(&mut self, value: i16) -> Result<()> {
        self.add_display(value)
    }

    pub fn add_i32(&mut self, value: i32) -> Result<()> {
        self.add_display(value)
    }

    pub fn add_i64(&mut self, value: i64) -> Result<()> {
        self.add_display(value)
    }

    pub fn add_u32(&mut self, value: u32) -> Result<()> {
        self.add_display(value)
    }

    pub fn add_u64(&mut self, value: u64) -> Result<()> {
        self.add_display(value)
    }

    /// Appends a double as its shortest round-trip decimal form.
    pub fn add_f64(&mut self, value: f64) -> Result<()> {
        self.add_field(&format::format_f64(value), false)
    }

    pub fn add_f32(&mut self, value: f32) -> Result<()> {
        self.add_field(&format::format_f32(value), false)
    }

    /// Appends `TRUE` or `FALSE`.
    pub fn add_bool(&mut self, value: bool) -> Result<()> {
        self.add_field(format::format_bool(value), false)
    }

    /// Appends a timestamp as `yyyy-MM-dd HH:mm:ss.ffffff`.
    pub fn add_timestamp(&mut self, value: &NaiveDateTime) -> Result<()> {
        self.add_field(&format::format_timestamp(value), false)
    }

    /// Appends the UTC wall-clock time of `value`, without an offset.
    pub fn add_timestamp_utc(&mut self, value: &DateTime<Utc>) -> Result<()> {
        self.add_timestamp(&value.naive_utc())
    }

    pub fn add_date(&mut self, value: &NaiveDate) -> Result<()> {
        self.add_field(&format::format_date(value), false)
    }

    /// Appends a `bytea` value in hex form.
    pub fn add_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.add_field(&format::format_bytea(value), true)
    }

    /// Appends a whole row from any serde struct, tuple or sequence of scalars,
    /// then completes it with [`end_row`](Self::end_row).
    ///
    /// `None` and unit values become NULL. A nested struct, map or sequence
    /// inside a field fails with [`Error::UnsupportedType`]; the row is then
    /// left partially written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use copy_text::{CopyOptions, CopySerializer};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct User { id: u32, name: String, email: Option<String> }
    ///
    /// let mut ser = CopySerializer::new(Vec::<u8>::new(), 3, CopyOptions::new()).unwrap();
    /// ser.add_row(&User { id: 1, name: "Ann".into(), email: None }).unwrap();
    /// assert_eq!(ser.close().unwrap(), b"1\tAnn\t\\N\n");
    /// ```
    pub fn add_row<T>(&mut self, row: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        row.serialize(RowSerializer::new(self))?;
        self.end_row()
    }

    /// Completes the current row.
    ///
    /// Missing trailing fields are filled with the null marker, even when no
    /// field was written at all.
    pub fn end_row(&mut self) -> Result<()> {
        while self.at_field < self.field_count {
            self.add_null()?;
        }
        if self.options.format == CopyFormat::Text {
            self.buffer
                .append(self.options.separator.as_bytes(), &mut self.sink)?;
        }
        self.buffer.mark_row();
        self.at_field = 0;
        self.rows += 1;
        Ok(())
    }

    /// Hands every buffered byte to the sink and flushes it.
    ///
    /// This includes a partially written row. With nothing buffered the sink
    /// is not touched.
    pub fn flush(&mut self) -> Result<()> {
        self.buffer.flush(&mut self.sink)?;
        Ok(())
    }

    /// Hands every completed row to the sink.
    pub fn flush_rows(&mut self) -> Result<()> {
        self.buffer.flush_rows(&mut self.sink)?;
        Ok(())
    }

    /// Hands every completed field to the sink.
    pub fn flush_fields(&mut self) -> Result<()> {
        self.buffer.flush_fields(&mut self.sink)?;
        Ok(())
    }

    /// Completes a partially built row, flushes everything and returns the sink.
    pub fn close(mut self) -> Result<W> {
        if self.at_field > 0 {
            self.end_row()?;
        }
        self.flush()?;
        debug!("Closed COPY serializer after {} rows", self.rows);
        Ok(self.sink)
    }
}

impl<W: Write> fmt::Debug for CopySerializer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopySerializer")
            .field("options", &self.options)
            .field("field_count", &self.field_count)
            .field("at_field", &self.at_field)
            .field("buffered", &self.buffer.len())
            .field("active", &self.is_active())
            .finish()
    }
}
