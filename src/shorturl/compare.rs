/// Code ordering shared by the sorter, the verifier and the deduplicator.
/// Allocation-free; one table lookup per compared byte.
use std::cmp::Ordering;

use super::code::Code;
use super::record::Record;

/// Character classes in ascending sort precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CodeClass {
    Digit,
    Lower,
    Upper,
    Other,
}

impl CodeClass {
    #[inline]
    pub const fn of(b: u8) -> Self {
        match b {
            b'0'..=b'9' => CodeClass::Digit,
            b'a'..=b'z' => CodeClass::Lower,
            b'A'..=b'Z' => CodeClass::Upper,
            _ => CodeClass::Other,
        }
    }
}

/// Sort rank of every byte: class in the high byte, raw value in the low one.
const RANK: [u16; 256] = build_rank_table();

const fn build_rank_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = ((CodeClass::of(i as u8) as u16) << 8) | i as u16;
        i += 1;
    }
    table
}

/// Compare two codes position by position: the first differing byte decides,
/// digits before lowercase before uppercase before anything else, then raw
/// byte value within a class. When one code is a prefix of the other the
/// shorter one sorts first.
#[inline]
pub fn compare_code_bytes(a: &[u8], b: &[u8]) -> Ordering {
    for (&x, &y) in a.iter().zip(b) {
        if x != y {
            return RANK[x as usize].cmp(&RANK[y as usize]);
        }
    }
    a.len().cmp(&b.len())
}

#[inline]
pub fn compare_codes(a: &Code, b: &Code) -> Ordering {
    compare_code_bytes(a.as_bytes(), b.as_bytes())
}

/// Records order by code only; the URL never participates.
#[inline]
pub fn compare_records(a: &Record, b: &Record) -> Ordering {
    compare_codes(&a.code, &b.code)
}
