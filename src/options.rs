//! Configuration options for COPY text serialization.
//!
//! This module provides types to customize the produced stream:
//!
//! - [`CopyOptions`]: delimiter, row separator, escape prefix, null marker and
//!   buffer capacity
//! - [`CopyFormat`]: the transfer format the rows are framed for
//!
//! ## Examples
//!
//! ```rust
//! use copy_text::CopyOptions;
//!
//! // Pipe-separated rows with an empty string for NULL
//! let options = CopyOptions::new().with_delimiter("|").with_null("");
//! assert!(options.validate().is_ok());
//!
//! // Escape prefixes are exactly one character
//! assert!(CopyOptions::new().with_escape("").validate().is_err());
//! ```

use crate::{Error, Result};

/// Buffer capacity used when none is configured.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// Transfer format the serializer frames rows for.
///
/// Only the text grammar is produced; [`CopyFormat::Binary`] suppresses the
/// row separator because binary transfers carry their own row framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CopyFormat {
    #[default]
    Text,
    Binary,
}

/// Configuration options for a [`CopySerializer`](crate::CopySerializer).
///
/// # Examples
///
/// ```rust
/// use copy_text::{CopyFormat, CopyOptions};
///
/// let options = CopyOptions::new();
/// assert_eq!(options.delimiter, "\t");
/// assert_eq!(options.separator, "\n");
/// assert_eq!(options.escape, "\\");
/// assert_eq!(options.null, "\\N");
/// assert_eq!(options.buffer_capacity, 8192);
/// assert_eq!(options.format, CopyFormat::Text);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CopyOptions {
    pub delimiter: String,
    pub separator: String,
    pub escape: String,
    pub null: String,
    pub buffer_capacity: usize,
    pub format: CopyFormat,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            delimiter: "\t".to_string(),
            separator: "\n".to_string(),
            escape: "\\".to_string(),
            null: "\\N".to_string(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            format: CopyFormat::default(),
        }
    }
}

impl CopyOptions {
    /// Creates the server's default text-format options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter. Must be a single character.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Sets the row separator. Must be a single character.
    #[must_use]
    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    /// Sets the escape prefix. Must be a single character.
    #[must_use]
    pub fn with_escape(mut self, escape: &str) -> Self {
        self.escape = escape.to_string();
        self
    }

    /// Sets the marker written for NULL fields. Written verbatim, never escaped.
    #[must_use]
    pub fn with_null(mut self, null: &str) -> Self {
        self.null = null.to_string();
        self
    }

    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: CopyFormat) -> Self {
        self.format = format;
        self
    }

    /// Checks that the options describe an unambiguous stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when:
    ///
    /// - the delimiter, separator or escape prefix is not exactly one character
    /// - one of them is an ASCII letter or digit, `.`, `-`, `+`, `:` or a space
    ///   (these occur in escape sequences and in unescaped numbers, booleans
    ///   and timestamps)
    /// - two of them coincide
    /// - the null marker contains the delimiter, separator, CR or LF
    /// - the buffer capacity is zero
    pub fn validate(&self) -> Result<()> {
        self.reserved_chars()?;
        validate_capacity(self.buffer_capacity)
    }

    /// Returns the delimiter, separator and escape prefix as characters.
    pub(crate) fn reserved_chars(&self) -> Result<(char, char, char)> {
        let delimiter = reserved_char("delimiter", &self.delimiter)?;
        let separator = reserved_char("separator", &self.separator)?;
        let escape = reserved_char("escape", &self.escape)?;

        if delimiter == escape || separator == escape {
            return Err(Error::configuration(format!(
                "escape {:?} collides with the delimiter or separator",
                escape
            )));
        }
        if delimiter == separator {
            return Err(Error::configuration(format!(
                "delimiter and separator are both {:?}",
                delimiter
            )));
        }
        if let Some(c) = self
            .null
            .chars()
            .find(|&c| c == delimiter || c == separator || c == '\r' || c == '\n')
        {
            return Err(Error::configuration(format!(
                "null marker {:?} contains the reserved character {:?}",
                self.null, c
            )));
        }
        Ok((delimiter, separator, escape))
    }
}

/// Returns the only character of `value`, or a configuration error naming `what`.
pub(crate) fn single_char(what: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::configuration(format!(
            "{} must be exactly one character, got {:?}",
            what, value
        ))),
    }
}

/// Like [`single_char`], also rejecting characters that the grammar or the
/// typed formatters produce unescaped.
fn reserved_char(what: &str, value: &str) -> Result<char> {
    let c = single_char(what, value)?;
    if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | ':' | ' ') {
        return Err(Error::configuration(format!(
            "{} {:?} would be ambiguous with escape sequences or formatted values",
            what, c
        )));
    }
    Ok(c)
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::configuration("buffer capacity must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(CopyOptions::default().validate().is_ok());
    }

    #[test]
    fn test_multi_char_strings_rejected() {
        let cases = [
            CopyOptions::new().with_delimiter("||"),
            CopyOptions::new().with_separator("\r\n"),
            CopyOptions::new().with_escape("\\\\"),
            CopyOptions::new().with_escape(""),
        ];
        for options in cases {
            assert!(
                matches!(options.validate(), Err(Error::Configuration(_))),
                "{:?} should be rejected",
                options
            );
        }
    }

    #[test]
    fn test_null_marker_may_be_any_width() {
        assert!(CopyOptions::new().with_null("").validate().is_ok());
        assert!(CopyOptions::new().with_null("<null>").validate().is_ok());
    }

    #[test]
    fn test_collisions_rejected() {
        assert!(CopyOptions::new().with_delimiter("\\").validate().is_err());
        assert!(CopyOptions::new().with_delimiter("\n").validate().is_err());
        assert!(CopyOptions::new().with_escape("\n").validate().is_err());
    }

    #[test]
    fn test_escape_letters_and_digits_rejected() {
        for c in ["n", "t", "b", "f", "r", "v", "0", "7", "N", "x"] {
            assert!(CopyOptions::new().with_delimiter(c).validate().is_err());
            assert!(CopyOptions::new().with_separator(c).validate().is_err());
            assert!(CopyOptions::new().with_escape(c).validate().is_err());
        }
    }

    #[test]
    fn test_formatted_value_chars_rejected() {
        for c in [".", "-", "+", ":", " ", "e", "T", "I"] {
            let err = CopyOptions::new().with_delimiter(c).validate();
            assert!(matches!(err, Err(Error::Configuration(_))), "{:?}", c);
            assert!(CopyOptions::new().with_separator(c).validate().is_err());
            assert!(CopyOptions::new().with_escape(c).validate().is_err());
        }
    }

    #[test]
    fn test_null_marker_with_reserved_chars_rejected() {
        let cases = [
            CopyOptions::new().with_null("a\tb"),
            CopyOptions::new().with_null("N\n"),
            CopyOptions::new().with_null("\r"),
            CopyOptions::new().with_delimiter(",").with_null("a,b"),
            CopyOptions::new().with_separator(";").with_null(";"),
        ];
        for options in cases {
            assert!(
                matches!(options.validate(), Err(Error::Configuration(_))),
                "{:?} should be rejected",
                options
            );
        }
        // The escape prefix may appear in the marker.
        assert!(CopyOptions::new().with_null("\\N").validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(CopyOptions::new().with_buffer_capacity(0).validate().is_err());
    }

    #[test]
    fn test_non_ascii_single_char_accepted() {
        let options = CopyOptions::new().with_delimiter("¦");
        assert!(options.validate().is_ok());
    }
}
