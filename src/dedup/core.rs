/// Drop repeated records from a sorted file and report codes that map to
/// more than one URL.
use std::collections::HashSet;
use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::common::io::{LineReader, LineSink};
use crate::error::Result;
use crate::shorturl::{Code, ParseError, split_line, write_record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Non-blank records read.
    pub records: u64,
    pub emitted: u64,
    /// Exact `code|url` repeats that were dropped.
    pub duplicates: u64,
    /// Records whose code was already emitted with a different URL.
    pub conflicts: u64,
    pub blank_lines: u64,
}

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Emit,
    /// Emitted, but the code already had another URL.
    Conflict,
    Duplicate,
}

/// Per-code URL memory. Only adjacent records can collide, so the input must
/// be sorted (or at least grouped by code).
#[derive(Debug, Default)]
pub struct Deduplicator {
    current: Option<Code>,
    urls: HashSet<Vec<u8>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Deduplicator::default()
    }

    pub fn classify(&mut self, code: Code, url: &[u8]) -> Verdict {
        if self.current == Some(code) {
            if self.urls.contains(url) {
                return Verdict::Duplicate;
            }
            self.urls.insert(url.to_vec());
            Verdict::Conflict
        } else {
            self.current = Some(code);
            self.urls.clear();
            self.urls.insert(url.to_vec());
            Verdict::Emit
        }
    }
}

/// Copy `input` to `out`, dropping exact duplicates. Blank lines are skipped.
pub fn dedup_lines<R: BufRead, W: Write>(
    input: &mut LineReader<R>,
    out: &mut LineSink<W>,
) -> Result<DedupStats> {
    let mut dedup = Deduplicator::new();
    let mut stats = DedupStats::default();

    loop {
        let line_no = input.line_number() + 1;
        let Some(line) = input.next_line()? else {
            break;
        };
        if line == b"\n" || line.is_empty() {
            stats.blank_lines += 1;
            debug!(line = line_no, "skipping blank line");
            continue;
        }

        let (code, url) =
            split_line(line).map_err(|kind| ParseError::new(kind, line_no, line))?;
        stats.records += 1;

        match dedup.classify(code, url) {
            Verdict::Duplicate => {
                stats.duplicates += 1;
                continue;
            }
            Verdict::Conflict => {
                stats.conflicts += 1;
                warn!(code = %code, line = line_no, "duplicate URLs for code");
            }
            Verdict::Emit => {}
        }

        write_record(out, &code, url)?;
        stats.emitted += 1;
    }

    out.flush()?;
    info!(
        records = stats.records,
        emitted = stats.emitted,
        duplicates = stats.duplicates,
        conflicts = stats.conflicts,
        "dedup complete"
    );
    Ok(stats)
}
