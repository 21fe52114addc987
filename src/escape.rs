//! Escape sequences for reserved characters.
//!
//! A COPY text field may not contain the delimiter, the row separator, the
//! escape prefix, CR or LF verbatim. Each of these is replaced by the escape
//! prefix followed by an escape sequence:
//!
//! | Character | Sequence |
//! |-----------|----------|
//! | backspace, form feed, LF, CR, tab, vertical tab | `b`, `f`, `n`, `r`, `t`, `v` |
//! | other control or non-ASCII characters | three octal digits per UTF-8 byte |
//! | anything else | the character itself |
//!
//! The table is computed once per configuration; lookups for characters outside
//! the reserved set return `None` and the character is written unchanged.

/// Precomputed escape sequences for one configuration.
#[derive(Clone, Debug)]
pub struct EscapeTable {
    // Index into `sequences` plus one; zero means the character passes through.
    ascii: [u8; 128],
    wide: Vec<(char, usize)>,
    sequences: Vec<Vec<u8>>,
}

impl EscapeTable {
    /// Builds the table for the given delimiter, separator and escape prefix.
    pub fn new(delimiter: char, separator: char, escape: char) -> Self {
        let mut table = EscapeTable {
            ascii: [0; 128],
            wide: Vec::new(),
            sequences: Vec::with_capacity(5),
        };
        for c in [delimiter, separator, escape, '\r', '\n'] {
            table.insert(c, escape);
        }
        table
    }

    fn insert(&mut self, c: char, escape: char) {
        if self.lookup(c).is_some() {
            return;
        }
        self.sequences.push(escape_sequence(c, escape));
        let slot = self.sequences.len();
        if c.is_ascii() {
            self.ascii[c as usize] = slot as u8;
        } else {
            self.wide.push((c, slot));
        }
    }

    /// Returns the full escaped bytes (prefix included) for a reserved character.
    #[inline]
    pub fn lookup(&self, c: char) -> Option<&[u8]> {
        let slot = if c.is_ascii() {
            self.ascii[c as usize] as usize
        } else {
            self.wide
                .iter()
                .find(|(wide, _)| *wide == c)
                .map_or(0, |(_, slot)| *slot)
        };
        match slot {
            0 => None,
            n => Some(&self.sequences[n - 1]),
        }
    }

    /// Splits `value` into byte chunks that can be appended in order: runs of
    /// characters that pass through, interleaved with escape sequences.
    pub fn segments<'a>(&'a self, value: &'a str) -> Segments<'a> {
        Segments {
            table: self,
            rest: value,
            pending: None,
        }
    }

    /// Escapes `value` into a fresh byte vector.
    pub fn escape(&self, value: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(value.len());
        for chunk in self.segments(value) {
            out.extend_from_slice(chunk);
        }
        out
    }
}

fn escape_sequence(c: char, escape: char) -> Vec<u8> {
    let mut prefix = [0u8; 4];
    let prefix = escape.encode_utf8(&mut prefix).as_bytes();
    let mut out = prefix.to_vec();
    let mnemonic = match c {
        '\u{0008}' => Some(b'b'),
        '\u{000C}' => Some(b'f'),
        '\n' => Some(b'n'),
        '\r' => Some(b'r'),
        '\t' => Some(b't'),
        '\u{000B}' => Some(b'v'),
        _ => None,
    };
    if let Some(letter) = mnemonic {
        out.push(letter);
    } else if c.is_ascii_control() || !c.is_ascii() {
        let mut utf8 = [0u8; 4];
        for (i, byte) in c.encode_utf8(&mut utf8).bytes().enumerate() {
            if i > 0 {
                out.extend_from_slice(prefix);
            }
            out.extend_from_slice(format!("{:03o}", byte).as_bytes());
        }
    } else {
        out.push(c as u8);
    }
    out
}

/// Iterator returned by [`EscapeTable::segments`].
pub struct Segments<'a> {
    table: &'a EscapeTable,
    rest: &'a str,
    pending: Option<&'a [u8]>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(sequence) = self.pending.take() {
            return Some(sequence);
        }
        if self.rest.is_empty() {
            return None;
        }
        let (table, rest) = (self.table, self.rest);
        for (i, c) in rest.char_indices() {
            if let Some(sequence) = table.lookup(c) {
                self.rest = &rest[i + c.len_utf8()..];
                if i == 0 {
                    return Some(sequence);
                }
                self.pending = Some(sequence);
                return Some(rest[..i].as_bytes());
            }
        }
        self.rest = "";
        Some(rest.as_bytes())
    }
}
