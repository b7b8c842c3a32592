//! Line reading and token grammar shared by the header and feature parsers.

use std::io::{self, BufRead};

/// One input line with its terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) number: usize,
    pub(crate) text: String,
}

impl Line {
    /// Whether the line holds nothing but whitespace.
    pub(crate) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Numbered line source over a buffered reader.
#[derive(Debug)]
pub(crate) struct LineReader<R> {
    inner: R,
    number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) const fn new(inner: R) -> Self {
        Self { inner, number: 0 }
    }

    /// Next line, or `None` at end of input. Accepts `\n` and `\r\n`.
    ///
    /// Bytes that are not UTF-8 are replaced with U+FFFD.
    pub(crate) fn next_line(&mut self) -> io::Result<Option<Line>> {
        let mut bytes = Vec::new();
        if self.inner.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        self.number += 1;
        Ok(Some(Line {
            number: self.number,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }))
    }

    /// Next non-blank line, or `None` at end of input.
    pub(crate) fn next_content_line(&mut self) -> io::Result<Option<Line>> {
        while let Some(line) = self.next_line()? {
            if !line.is_blank() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}

/// Outcome of parsing an optional trailing token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field<T> {
    Absent,
    Present(T),
    Malformed,
}

/// Whitespace-separated tokens of a line.
pub(crate) struct Tokens<'a> {
    inner: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace(),
        }
    }

    /// Parse a required token. `None` when missing or malformed.
    pub(crate) fn required<T: std::str::FromStr>(&mut self) -> Option<T> {
        self.inner.next().and_then(|token| token.parse().ok())
    }

    /// Parse an optional token, distinguishing absence from bad syntax.
    pub(crate) fn optional<T: std::str::FromStr>(&mut self) -> Field<T> {
        match self.inner.next() {
            None => Field::Absent,
            Some(token) => token.parse().map_or(Field::Malformed, Field::Present),
        }
    }
}
