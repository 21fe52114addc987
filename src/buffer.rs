//! The output buffer and its flusher.
//!
//! [`OutputBuffer`] owns every byte that has been serialized but not yet
//! handed to the sink. Besides the write cursor it tracks two checkpoints:
//!
//! - `last_field_end`: the end of the last completed field
//! - `last_row_end`: the end of the last completed row
//!
//! Both stay within `0..=len`, and `last_row_end <= last_field_end` because a
//! completed row also completes its last field. Partial flushes only ever
//! release bytes up to a checkpoint, so the sink never sees half a field
//! unless [`OutputBuffer::flush`] is called explicitly.
//!
//! When a write does not fit, [`OutputBuffer::make_room`] releases completed
//! rows first, then completed fields, and only then grows the buffer by the
//! missing amount.

use crate::{Error, Result};
use std::io::{self, Write};
use tracing::{debug, trace};

/// Growable byte buffer with field and row checkpoints.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
    capacity: usize,
    last_field_end: usize,
    last_row_end: usize,
}

impl OutputBuffer {
    /// Creates an empty buffer. Memory is reserved on the first write.
    pub fn new(capacity: usize) -> Self {
        OutputBuffer {
            buf: Vec::new(),
            capacity,
            last_field_end: 0,
            last_row_end: 0,
        }
    }

    /// Number of buffered bytes (the write cursor).
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn last_field_end(&self) -> usize {
        self.last_field_end
    }

    pub fn last_row_end(&self) -> usize {
        self.last_row_end
    }

    /// The buffered, not yet flushed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Records the cursor as the end of a completed field.
    pub fn mark_field(&mut self) {
        self.last_field_end = self.buf.len();
    }

    /// Records the cursor as the end of a completed row (and field).
    pub fn mark_row(&mut self) {
        self.last_field_end = self.buf.len();
        self.last_row_end = self.buf.len();
    }

    /// Appends `bytes`, making room first.
    pub fn append<W: Write + ?Sized>(&mut self, bytes: &[u8], sink: &mut W) -> io::Result<()> {
        self.make_room(bytes.len(), sink)?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Ensures at least `n` free bytes, flushing completed rows, then completed
    /// fields, and finally growing by exactly the shortfall.
    pub fn make_room<W: Write + ?Sized>(&mut self, n: usize, sink: &mut W) -> io::Result<()> {
        if self.free() < n {
            self.flush_rows(sink)?;
        }
        if self.free() < n {
            self.flush_fields(sink)?;
        }
        if self.free() < n {
            self.grow(n - self.free());
        }
        if self.buf.capacity() < self.capacity {
            self.buf.reserve_exact(self.capacity - self.buf.len());
        }
        Ok(())
    }

    /// Raises the capacity by `additional` bytes.
    pub fn grow(&mut self, additional: usize) {
        trace!(
            "Growing COPY buffer from {} to {} bytes",
            self.capacity,
            self.capacity + additional
        );
        self.capacity += additional;
    }

    /// Writes the first `n` bytes to the sink and shifts the remainder to the front.
    ///
    /// Checkpoints are moved down by `n`; a checkpoint inside the flushed prefix
    /// collapses to zero.
    pub fn flush_prefix<W: Write + ?Sized>(&mut self, n: usize, sink: &mut W) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        sink.write_all(&self.buf[..n])?;
        self.buf.drain(..n);
        self.last_field_end = self.last_field_end.saturating_sub(n);
        self.last_row_end = self.last_row_end.saturating_sub(n);
        Ok(())
    }

    /// Writes every completed row to the sink.
    pub fn flush_rows<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        let n = self.last_row_end;
        if n > 0 {
            debug!("Flushing {} bytes of completed rows", n);
        }
        self.flush_prefix(n, sink)
    }

    /// Writes every completed field to the sink.
    pub fn flush_fields<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        let n = self.last_field_end;
        if n > 0 {
            debug!("Flushing {} bytes of completed fields", n);
        }
        self.flush_prefix(n, sink)
    }

    /// Writes everything, partial fields included, and flushes the sink.
    ///
    /// Does nothing at all when the buffer is empty.
    pub fn flush<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        debug!("Flushing {} buffered bytes", self.buf.len());
        sink.write_all(&self.buf)?;
        sink.flush()?;
        self.buf.clear();
        self.last_field_end = 0;
        self.last_row_end = 0;
        Ok(())
    }

    /// Changes the capacity, keeping every buffered byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the buffered bytes would not fit.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        if capacity < self.buf.len() {
            return Err(Error::configuration(format!(
                "buffer capacity {} is smaller than the {} bytes still buffered",
                capacity,
                self.buf.len()
            )));
        }
        self.capacity = capacity;
        if self.buf.capacity() > capacity {
            self.buf.shrink_to(capacity);
        }
        Ok(())
    }
}
