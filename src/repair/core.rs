/// Clean up records scraped from a shortener that padded its codes with
/// leading zeros and served placeholder URLs for dead links.
use std::collections::HashSet;
use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::common::io::{LineReader, LineSink};
use crate::error::Result;
use crate::shorturl::{Code, ParseError, ParseErrorKind, SEPARATOR, write_record};

/// Error page the shortener answered with instead of a redirect.
pub const DEFAULT_BAD_URLS: &[&str] = &["http://4url.cc/error.html"];

/// Why a line was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Blank,
    /// Nothing left once the zero padding was removed.
    EmptyCode,
    /// No separator, or nothing after it.
    MissingUrl,
    BadUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair<'a> {
    Keep { code: Code, url: &'a [u8] },
    Drop(DropReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Lines read, blank ones included.
    pub lines: u64,
    pub emitted: u64,
    /// Emitted records whose code lost leading zeros.
    pub stripped: u64,
    pub blank_lines: u64,
    pub empty_codes: u64,
    pub missing_urls: u64,
    pub bad_urls: u64,
}

impl RepairStats {
    pub fn dropped(&self) -> u64 {
        self.empty_codes + self.missing_urls + self.bad_urls
    }

    fn count_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::Blank => self.blank_lines += 1,
            DropReason::EmptyCode => self.empty_codes += 1,
            DropReason::MissingUrl => self.missing_urls += 1,
            DropReason::BadUrl => self.bad_urls += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Repairer {
    bad_urls: HashSet<Vec<u8>>,
}

impl Default for Repairer {
    fn default() -> Self {
        Repairer::with_bad_urls(DEFAULT_BAD_URLS.iter().copied())
    }
}

impl Repairer {
    /// A repairer that drops exactly the given URLs.
    pub fn with_bad_urls<I, U>(urls: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: AsRef<[u8]>,
    {
        Repairer {
            bad_urls: urls.into_iter().map(|u| u.as_ref().to_vec()).collect(),
        }
    }

    pub fn is_bad_url(&self, url: &[u8]) -> bool {
        self.bad_urls.contains(url)
    }

    /// Decide what to do with one raw line. The URL is borrowed from `line`.
    ///
    /// Only a code that is still too long after stripping is an error; every
    /// other defect drops the line.
    pub fn repair_line<'a>(
        &self,
        line: &'a [u8],
    ) -> std::result::Result<Repair<'a>, ParseErrorKind> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        if line.is_empty() {
            return Ok(Repair::Drop(DropReason::Blank));
        }

        let (raw_code, url) = match memchr::memchr(SEPARATOR, line) {
            Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
            None => (line, None),
        };

        let first_kept = raw_code
            .iter()
            .position(|&b| b != b'0')
            .unwrap_or(raw_code.len());
        let stripped = &raw_code[first_kept..];
        if stripped.is_empty() {
            return Ok(Repair::Drop(DropReason::EmptyCode));
        }

        let url = match url {
            Some(url) if !url.is_empty() => url,
            _ => return Ok(Repair::Drop(DropReason::MissingUrl)),
        };
        if self.is_bad_url(url) {
            return Ok(Repair::Drop(DropReason::BadUrl));
        }

        let code = Code::new(stripped)?;
        Ok(Repair::Keep { code, url })
    }
}

/// Copy `input` to `out`, stripping zero padding from codes and dropping
/// records that cannot be repaired.
pub fn repair_lines<R: BufRead, W: Write>(
    input: &mut LineReader<R>,
    out: &mut LineSink<W>,
    repairer: &Repairer,
) -> Result<RepairStats> {
    let mut stats = RepairStats::default();

    loop {
        let line_no = input.line_number() + 1;
        let Some(line) = input.next_line()? else {
            break;
        };
        stats.lines += 1;

        match repairer
            .repair_line(line)
            .map_err(|kind| ParseError::new(kind, line_no, line))?
        {
            Repair::Keep { code, url } => {
                let raw_len = memchr::memchr(SEPARATOR, line).unwrap_or(line.len());
                if raw_len != code.len() {
                    stats.stripped += 1;
                }
                write_record(out, &code, url)?;
                stats.emitted += 1;
            }
            Repair::Drop(reason) => {
                debug!(line = line_no, ?reason, "dropping line");
                stats.count_drop(reason);
            }
        }
    }

    out.flush()?;
    if stats.dropped() > 0 {
        warn!(
            empty_codes = stats.empty_codes,
            missing_urls = stats.missing_urls,
            bad_urls = stats.bad_urls,
            "dropped unrepairable records"
        );
    }
    info!(
        lines = stats.lines,
        emitted = stats.emitted,
        stripped = stats.stripped,
        "repair complete"
    );
    Ok(stats)
}
