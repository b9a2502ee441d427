/// Bounded-window sort for record files that are only slightly out of order.
///
/// The input is assumed to never displace a record by more than `window`
/// positions from where it belongs. Under that assumption everything except
/// the newest `window` buffered records is final once the buffer is sorted,
/// so memory stays at `O(window + chunk)` regardless of file size.
/// A violated assumption is caught by [`WindowSorter::flush`] instead of
/// producing a wrongly ordered file.
use std::cmp::Ordering;
use std::io::{BufRead, Write};
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::common::io::{LineReader, LineSink, ReadStatus, create_output, open_input};
use crate::common::io::{require_absent, require_input_file};
use crate::error::{Error, Result};
use crate::shorturl::{Code, Record, compare_codes, compare_records};

/// Default window: records more than this far from their sorted position
/// make the run fail.
pub const DEFAULT_WINDOW: usize = 2_000_000;

/// Buffers shorter than this are sorted on the calling thread.
const PARALLEL_SORT_THRESHOLD: usize = 10_000;

/// Configuration for a sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    /// Maximum arrival-order distance between two records that must be swapped.
    pub window: usize,
    /// Lines read per ingest step.
    pub chunk_size: usize,
    /// Threads used for the in-memory sort (None = rayon default).
    pub parallel: Option<usize>,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            window: DEFAULT_WINDOW,
            chunk_size: DEFAULT_WINDOW,
            parallel: None,
        }
    }
}

impl SortConfig {
    pub fn with_window(window: usize) -> Self {
        SortConfig {
            window,
            chunk_size: window,
            parallel: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::Precondition("window size must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(Error::Precondition("chunk size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    pub records_read: u64,
    pub records_written: u64,
    pub flushes: u64,
    pub peak_buffer: usize,
}

/// Sort buffer plus the commit watermark for one run.
pub struct WindowSorter<R> {
    input: LineReader<R>,
    buffer: Vec<Record>,
    /// Highest code written so far.
    last_code: Code,
    config: SortConfig,
    stats: SortStats,
}

impl<R: BufRead> WindowSorter<R> {
    pub fn new(input: LineReader<R>, config: SortConfig) -> Self {
        WindowSorter {
            input,
            buffer: Vec::new(),
            last_code: Code::EMPTY,
            config,
            stats: SortStats::default(),
        }
    }

    pub fn buffer(&self) -> &[Record] {
        &self.buffer
    }

    pub fn last_code(&self) -> Code {
        self.last_code
    }

    pub fn stats(&self) -> SortStats {
        self.stats
    }

    /// Read up to `chunk_size` lines into the buffer. Returns the number of
    /// records read, 0 at end of input. A malformed line aborts the run.
    pub fn ingest(&mut self, chunk_size: usize) -> Result<usize> {
        let mut read = 0;
        while read < chunk_size {
            match self.input.read_line()? {
                ReadStatus::Line => {
                    let record = Record::decode(self.input.line(), self.input.line_number())?;
                    self.buffer.push(record);
                    read += 1;
                }
                ReadStatus::Again => continue,
                ReadStatus::Eof => break,
            }
        }
        self.stats.records_read += read as u64;
        self.stats.peak_buffer = self.stats.peak_buffer.max(self.buffer.len());
        Ok(read)
    }

    /// Sort the whole buffer by code. Stable, so equal codes keep arrival order.
    pub fn sort_buffer(&mut self) {
        if self.buffer.len() > PARALLEL_SORT_THRESHOLD {
            self.buffer.par_sort_by(compare_records);
        } else {
            self.buffer.sort_by(compare_records);
        }
    }

    /// Write every buffered record except the last `keep_tail` and drop them
    /// from the buffer. The buffer must already be sorted.
    ///
    /// Fails with [`Error::Unsorted`] if the buffer head sorts before the last
    /// committed code: some record travelled further than the window.
    pub fn flush<W: Write>(&mut self, out: &mut LineSink<W>, keep_tail: usize) -> Result<usize> {
        let Some(head) = self.buffer.first() else {
            return Ok(0);
        };
        if compare_codes(&self.last_code, &head.code) == Ordering::Greater {
            return Err(Error::Unsorted {
                previous: self.last_code,
                current: head.code,
                line: None,
            });
        }

        let count = self.buffer.len().saturating_sub(keep_tail);
        if count == 0 {
            // Nothing committed: re-check the next flush against the true tail.
            if let Some(tail) = self.buffer.last() {
                self.last_code = tail.code;
            }
            return Ok(0);
        }

        for record in &self.buffer[..count] {
            record.write_to(out)?;
        }
        self.last_code = self.buffer[count - 1].code;
        self.buffer.drain(..count);

        self.stats.records_written += count as u64;
        self.stats.flushes += 1;
        Ok(count)
    }

    /// Run the whole sort. `open_output` is only called once the input has
    /// proved non-empty, so an empty input leaves no output file behind.
    pub fn run<W, F>(mut self, open_output: F) -> Result<SortStats>
    where
        W: Write,
        F: FnOnce() -> Result<LineSink<W>>,
    {
        self.config.validate()?;
        let window = self.config.window;
        let chunk_size = self.config.chunk_size;

        if self.ingest(chunk_size)? == 0 {
            return Err(Error::Precondition(format!(
                "no data in input file '{}'",
                self.input.path().display()
            )));
        }

        let mut out = open_output()?;
        loop {
            let read = self.ingest(chunk_size)?;
            self.sort_buffer();
            let written = if self.buffer.len() > window {
                self.flush(&mut out, window)?
            } else {
                0
            };
            debug!(
                read,
                written,
                buffered = self.buffer.len(),
                last_code = %self.last_code,
                "sort loop"
            );
            if read == 0 {
                break;
            }
        }

        self.flush(&mut out, 0)?;
        let output = out.path().to_path_buf();
        out.finish()?;

        info!(
            records = self.stats.records_read,
            flushes = self.stats.flushes,
            peak_buffer = self.stats.peak_buffer,
            output = %output.display(),
            "sort complete"
        );
        Ok(self.stats)
    }
}

/// Sort `input` into a new file `output`.
///
/// Refuses to run if `input` is not a regular file or `output` already
/// exists. On failure a partially written `output` may remain.
pub fn sort_file(input: &Path, output: &Path, config: &SortConfig) -> Result<SortStats> {
    config.validate()?;
    require_input_file(input)?;
    require_absent(output)?;

    if let Some(n) = config.parallel {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n.max(1))
            .build_global()
            .ok();
    }

    let reader = open_input(input)?;
    WindowSorter::new(reader, config.clone()).run(|| create_output(output))
}

/// Parse a window size like "2000000", "500K" or "2M".
/// Suffixes are decimal: the window counts records, not bytes.
pub fn parse_window(s: &str) -> std::result::Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty window size".to_string());
    }

    let (num_part, suffix) = if s.ends_with(|c: char| c.is_ascii_alphabetic()) {
        let (n, s) = s.split_at(s.len() - 1);
        (n, s.chars().next())
    } else {
        (s, None)
    };

    let base: usize = num_part
        .parse()
        .map_err(|_| format!("invalid window size: {}", s))?;

    let multiplier: usize = match suffix {
        Some('K') | Some('k') => 1_000,
        Some('M') | Some('m') => 1_000_000,
        Some('G') | Some('g') => 1_000_000_000,
        Some(c) => return Err(format!("invalid suffix '{}' in window size", c)),
        None => 1,
    };

    let window = base
        .checked_mul(multiplier)
        .ok_or_else(|| format!("window size too large: {}", s))?;
    if window == 0 {
        return Err("window size must be at least 1".to_string());
    }
    Ok(window)
}
