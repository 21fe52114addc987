//! Canonical text for typed values.
//!
//! The outputs here consist of ASCII letters, digits, `.`, `-`, `+`, `:` and
//! spaces. [`CopyOptions::validate`](crate::CopyOptions::validate) rejects all
//! of these as delimiter, separator or escape prefix, so the serializer writes
//! them through its non-escaping path.
//! Byte strings are the exception: their `\x` prefix contains a backslash and
//! goes through escaping like any other string.
//!
//! | Type | Text |
//! |------|------|
//! | integers | `-42` |
//! | `f64` / `f32` | shortest round-trip decimal, `NaN`, `Infinity`, `-Infinity` |
//! | `bool` | `TRUE` / `FALSE` |
//! | timestamp | `2024-03-05 07:08:09.123456` |
//! | date | `2024-03-05` |
//! | bytes | `\x0aff` |

use chrono::{NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const DATE_FORMAT: &str = "%Y-%m-%d";
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[inline]
pub fn format_bool(v: bool) -> &'static str {
    if v {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub fn format_f64(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "Infinity".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        ryu::Buffer::new().format_finite(v).to_string()
    }
}

pub fn format_f32(v: f32) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f32::INFINITY {
        "Infinity".to_string()
    } else if v == f32::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        ryu::Buffer::new().format_finite(v).to_string()
    }
}

/// Formats as `yyyy-MM-dd HH:mm:ss.ffffff`, without a zone offset.
///
/// Years outside `0..=9999` carry an explicit sign and as many digits as they
/// need (`+10000-01-01 ...`, `-0001-01-01 ...`); the same holds for
/// [`format_date`].
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats bytes in the `bytea` hex input form.
pub fn format_bytea(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + 2 * bytes.len());
    out.push_str("\\x");
    for &b in bytes {
        out.push(HEX_DIGITS[usize::from(b >> 4)] as char);
        out.push(HEX_DIGITS[usize::from(b & 0x0f)] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool() {
        assert_eq!(format_bool(true), "TRUE");
        assert_eq!(format_bool(false), "FALSE");
    }

    #[test]
    fn test_f64() {
        assert_eq!(format_f64(1.5), "1.5");
        assert_eq!(format_f64(-0.1), "-0.1");
        assert_eq!(format_f64(f64::NAN), "NaN");
        assert_eq!(format_f64(f64::INFINITY), "Infinity");
        assert_eq!(format_f64(f64::NEG_INFINITY), "-Infinity");

        let v = 0.1 + 0.2;
        assert_eq!(format_f64(v).parse::<f64>().unwrap(), v);
    }

    #[test]
    fn test_f32() {
        assert_eq!(format_f32(0.1), "0.1");
        assert_eq!(format_f32(f32::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_micro_opt(7, 8, 9, 123_456)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-05 07:08:09.123456");

        let ts = NaiveDate::from_ymd_opt(33, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "0033-01-02 00:00:00.000000");
    }

    #[test]
    fn test_date() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(format_date(&date), "1999-12-31");
    }

    #[test]
    fn test_bytea() {
        assert_eq!(format_bytea(&[0x0a, 0xff, 0x00]), "\\x0aff00");
        assert_eq!(format_bytea(&[]), "\\x");
        assert_eq!(format_bytea(&[0x01, 0x9c, 0xa0]), "\\x019ca0");
    }

    #[test]
    fn test_years_outside_four_digits() {
        let ts = NaiveDate::from_ymd_opt(10000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "+10000-01-01 00:00:00.000000");

        let date = NaiveDate::from_ymd_opt(-1, 12, 31).unwrap();
        assert_eq!(format_date(&date), "-0001-12-31");
    }
}
