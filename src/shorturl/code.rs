use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use super::compare::compare_code_bytes;

/// Longest code a record may carry.
pub const MAX_CODE_LENGTH: usize = 6;

/// A short code stored inline, so buffers of records never allocate for it.
///
/// Bytes past `len` are always zero, which keeps the derived `Eq`/`Hash`
/// consistent with [`compare_codes`](super::compare_codes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    bytes: [u8; MAX_CODE_LENGTH],
    len: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("code too long ({0} bytes, at most {max} allowed)", max = MAX_CODE_LENGTH)]
    TooLong(usize),
    #[error("code contains forbidden byte 0x{0:02x}")]
    ForbiddenByte(u8),
}

impl Code {
    /// The empty code. Sorts before every other code.
    pub const EMPTY: Code = Code {
        bytes: [0; MAX_CODE_LENGTH],
        len: 0,
    };

    /// Build a code from raw bytes. The separator and line terminator can
    /// never be part of a code.
    pub fn new(src: &[u8]) -> Result<Self, CodeError> {
        if src.len() > MAX_CODE_LENGTH {
            return Err(CodeError::TooLong(src.len()));
        }
        if let Some(&b) = src.iter().find(|&&b| b == b'|' || b == b'\n') {
            return Err(CodeError::ForbiddenByte(b));
        }
        let mut bytes = [0u8; MAX_CODE_LENGTH];
        bytes[..src.len()].copy_from_slice(src);
        Ok(Code {
            bytes,
            len: src.len() as u8,
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl TryFrom<&[u8]> for Code {
    type Error = CodeError;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        Code::new(src)
    }
}

impl TryFrom<&str> for Code {
    type Error = CodeError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Code::new(src.as_bytes())
    }
}

impl Ord for Code {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        compare_code_bytes(self.as_bytes(), other.as_bytes())
    }
}

impl PartialOrd for Code {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}
