//! Test helpers: a reader for the COPY text grammar, a recording sink and log setup.

#![allow(dead_code)]

use copy_text::CopyOptions;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Routes the crate's logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub type Row = Vec<Option<String>>;

/// Parses a COPY text stream back into rows of optional strings.
pub fn decode(input: &[u8], options: &CopyOptions) -> Vec<Row> {
    let delimiter = options.delimiter.as_bytes();
    let separator = options.separator.as_bytes();
    let escape = options.escape.as_bytes();
    let null = options.null.as_bytes();

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = Vec::new();
    let mut field_start = 0;
    let mut i = 0;

    let finish = |field: &mut Vec<u8>, raw: &[u8]| -> Option<String> {
        let value = std::mem::take(field);
        if raw == null {
            None
        } else {
            Some(String::from_utf8(value).expect("decoded field is not UTF-8"))
        }
    };

    while i < input.len() {
        let rest = &input[i..];
        if rest.starts_with(escape) {
            i += escape.len();
            let c = input[i];
            match c {
                b'b' => field.push(0x08),
                b'f' => field.push(0x0c),
                b'n' => field.push(b'\n'),
                b'r' => field.push(b'\r'),
                b't' => field.push(b'\t'),
                b'v' => field.push(0x0b),
                b'0'..=b'7' => {
                    let mut value = 0u32;
                    let mut digits = 0;
                    while digits < 3 && i < input.len() && (b'0'..=b'7').contains(&input[i]) {
                        value = value * 8 + u32::from(input[i] - b'0');
                        i += 1;
                        digits += 1;
                    }
                    field.push(value as u8);
                    continue;
                }
                _ => {
                    let width = utf8_width(c);
                    field.extend_from_slice(&input[i..i + width]);
                    i += width;
                    continue;
                }
            }
            i += 1;
        } else if rest.starts_with(delimiter) {
            row.push(finish(&mut field, &input[field_start..i]));
            i += delimiter.len();
            field_start = i;
        } else if rest.starts_with(separator) {
            row.push(finish(&mut field, &input[field_start..i]));
            rows.push(std::mem::take(&mut row));
            i += separator.len();
            field_start = i;
        } else {
            field.push(input[i]);
            i += 1;
        }
    }
    assert!(row.is_empty() && field.is_empty(), "trailing partial row");
    rows
}

fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

/// Sink that records every write and flush.
#[derive(Default)]
pub struct RecordingSink {
    pub bytes: Vec<u8>,
    pub writes: Vec<usize>,
    pub flushes: usize,
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.len());
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
