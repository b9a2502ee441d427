use std::fmt;
use std::io::Write;

use thiserror::Error;

use super::code::{Code, CodeError, MAX_CODE_LENGTH};
use crate::common::io::LineSink;
use crate::error::Result as IoResult;

/// Splits the code from the URL. Only the first occurrence counts.
pub const SEPARATOR: u8 = b'|';
pub const TERMINATOR: u8 = b'\n';

/// One short-code mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub code: Code,
    pub url: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    MissingSeparator,
    CodeTooLong(usize),
    ForbiddenByte(u8),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MissingSeparator => write!(f, "no separator"),
            ParseErrorKind::CodeTooLong(n) => {
                write!(f, "code too long ({} bytes, at most {})", n, MAX_CODE_LENGTH)
            }
            ParseErrorKind::ForbiddenByte(b) => write!(f, "code contains byte 0x{:02x}", b),
        }
    }
}

impl From<CodeError> for ParseErrorKind {
    fn from(e: CodeError) -> Self {
        match e {
            CodeError::TooLong(n) => ParseErrorKind::CodeTooLong(n),
            CodeError::ForbiddenByte(b) => ParseErrorKind::ForbiddenByte(b),
        }
    }
}

/// A line that is not a valid record. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: {content:?}")]
pub struct ParseError {
    pub line: u64,
    pub kind: ParseErrorKind,
    pub content: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u64, raw: &[u8]) -> Self {
        ParseError {
            line,
            kind,
            content: String::from_utf8_lossy(strip_terminator(raw)).into_owned(),
        }
    }
}

#[inline]
fn strip_terminator(line: &[u8]) -> &[u8] {
    line.strip_suffix(&[TERMINATOR]).unwrap_or(line)
}

/// Split a raw line into its code and URL without copying the URL.
/// A single trailing newline is removed first.
pub fn split_line(line: &[u8]) -> Result<(Code, &[u8]), ParseErrorKind> {
    let line = strip_terminator(line);
    let pos = memchr::memchr(SEPARATOR, line).ok_or(ParseErrorKind::MissingSeparator)?;
    let code = Code::new(&line[..pos])?;
    Ok((code, &line[pos + 1..]))
}

/// Write `code|url\n` to `out` without building the line first.
pub fn write_record<W: Write>(out: &mut LineSink<W>, code: &Code, url: &[u8]) -> IoResult<()> {
    out.write_all(code.as_bytes())?;
    out.write_all(&[SEPARATOR])?;
    out.write_all(url)?;
    out.write_all(&[TERMINATOR])
}

/// Decode the code of a line, reporting `line_no` on failure.
pub fn decode_code(line: &[u8], line_no: u64) -> Result<Code, ParseError> {
    split_line(line)
        .map(|(code, _)| code)
        .map_err(|kind| ParseError::new(kind, line_no, line))
}

impl Record {
    pub fn new(code: Code, url: impl Into<Vec<u8>>) -> Self {
        Record {
            code,
            url: url.into(),
        }
    }

    /// Decode one line (with or without its trailing newline).
    pub fn decode(line: &[u8], line_no: u64) -> Result<Self, ParseError> {
        let (code, url) = split_line(line).map_err(|kind| ParseError::new(kind, line_no, line))?;
        Ok(Record {
            code,
            url: url.to_vec(),
        })
    }

    /// Encoded form, `code|url\n`.
    #[cfg(test)]
    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut sink = LineSink::new(Vec::with_capacity(self.url.len() + 8), "encode");
        self.write_to(&mut sink).unwrap();
        sink.finish().unwrap()
    }

    /// Write `code|url\n` to `out`.
    #[inline]
    pub fn write_to<W: Write>(&self, out: &mut LineSink<W>) -> IoResult<()> {
        write_record(out, &self.code, &self.url)
    }
}
