//! Byte cursor over OBJ text with line/column bookkeeping and a single
//! mark/restore slot for lookahead.

use crate::error::{Location, ObjError};

pub(crate) struct Scanner<'a> {
    source: &'a [u8],
    cursor: Location,
    mark: Location,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            cursor: Location::START,
            mark: Location::START,
        }
    }

    #[inline]
    pub(crate) fn location(&self) -> Location {
        self.cursor
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.cursor.offset >= self.source.len()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.source.get(self.cursor.offset).copied()
    }

    /// Byte `ahead` positions past the cursor.
    #[inline]
    pub(crate) fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.get(self.cursor.offset + ahead).copied()
    }

    /// Consume one byte.
    pub(crate) fn advance(&mut self) -> Result<u8, ObjError> {
        let byte = self.peek().ok_or(ObjError::UnexpectedEof {
            location: self.cursor,
        })?;
        self.cursor.offset += 1;
        if byte == b'\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        Ok(byte)
    }

    /// Remember the current position. Only the most recent mark is kept.
    #[inline]
    pub(crate) fn mark(&mut self) {
        self.mark = self.cursor;
    }

    #[inline]
    pub(crate) fn restore(&mut self) {
        self.cursor = self.mark;
    }

    /// Back to the first byte.
    pub(crate) fn rewind(&mut self) {
        self.cursor = Location::START;
        self.mark = Location::START;
    }

    /// Spaces and tabs; stops at a newline.
    pub(crate) fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.bump(1);
        }
    }

    /// Any whitespace including newlines, and `#` comments up to the end of line.
    pub(crate) fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.bump(1),
                Some(b'#') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump(1);
                    }
                }
                _ => break,
            }
        }
    }

    /// Consume `text` if the input continues with it; otherwise leave the cursor alone.
    pub(crate) fn accept_literal(&mut self, text: &str) -> bool {
        let rest = &self.source[self.cursor.offset..];
        if rest.starts_with(text.as_bytes()) {
            self.bump(text.len());
            true
        } else {
            false
        }
    }

    /// Skip blanks and read a float with `strtof` rules, hexadecimal
    /// (`0x1.8p3`) included.
    ///
    /// Returns `None` and leaves the cursor where it was if no number follows.
    pub(crate) fn parse_float(&mut self) -> Option<f32> {
        let start = self.cursor;
        self.skip_blanks();
        let rest = &self.source[self.cursor.offset..];
        let parsed = match parse_hex_float(rest) {
            Some(hex) => Ok(hex),
            None => fast_float::parse_partial::<f32, _>(rest),
        };
        match parsed {
            Ok((value, consumed)) if consumed > 0 => {
                self.bump(consumed);
                Some(value)
            }
            _ => {
                self.cursor = start;
                None
            }
        }
    }

    /// Skip blanks and read a base-10 unsigned integer. Values that do not fit
    /// saturate at `u32::MAX`, as `strtoul` does.
    pub(crate) fn parse_unsigned(&mut self) -> Option<u32> {
        let start = self.cursor;
        self.skip_blanks();
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(byte @ b'0'..=b'9') = self.peek() {
            value = value
                .saturating_mul(10)
                .saturating_add(u32::from(byte - b'0'));
            digits += 1;
            self.bump(1);
        }
        if digits == 0 {
            self.cursor = start;
            return None;
        }
        Some(value)
    }

    /// Advance over `count` bytes known to exist.
    fn bump(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_err() {
                break;
            }
        }
    }
}

/// `[+-]0x<hex digits>[.<hex digits>][p[+-]<decimal exponent>]`.
///
/// `None` unless at least one hex digit follows the prefix; `0x` alone is
/// left to the decimal parser, which reads the `0`.
fn parse_hex_float(bytes: &[u8]) -> Option<(f32, usize)> {
    let (negative, mut i) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    if !matches!(bytes.get(i..i + 2), Some([b'0', b'x' | b'X'])) {
        return None;
    }
    i += 2;

    let mut mantissa = 0f64;
    let mut exponent = 0i32;
    let mut digits = 0;
    let mut seen_dot = false;
    while let Some(&byte) = bytes.get(i) {
        if byte == b'.' && !seen_dot {
            seen_dot = true;
        } else if let Some(d) = char::from(byte).to_digit(16) {
            mantissa = mantissa * 16.0 + f64::from(d);
            if seen_dot {
                exponent = exponent.saturating_sub(4);
            }
            digits += 1;
        } else {
            break;
        }
        i += 1;
    }
    if digits == 0 {
        return None;
    }

    if let Some(b'p' | b'P') = bytes.get(i) {
        let mut j = i + 1;
        let exp_negative = match bytes.get(j) {
            Some(b'-') => {
                j += 1;
                true
            }
            Some(b'+') => {
                j += 1;
                false
            }
            _ => false,
        };
        let exp_start = j;
        let mut e = 0i32;
        while let Some(&byte @ b'0'..=b'9') = bytes.get(j) {
            e = e.saturating_mul(10).saturating_add(i32::from(byte - b'0'));
            j += 1;
        }
        // A bare `p` is not part of the number.
        if j > exp_start {
            exponent = exponent.saturating_add(if exp_negative { -e } else { e });
            i = j;
        }
    }

    let value = (mantissa * 2f64.powi(exponent)) as f32;
    Some((if negative { -value } else { value }, i))
}
