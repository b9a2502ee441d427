/// CSV export in the archive layout: `url,code,,\r\n` per record.
use std::io::{BufRead, Write};

use memchr::memmem;
use tracing::info;

use crate::common::io::{LineReader, LineSink};
use crate::error::Result;
use crate::shorturl::{ParseError, split_line};

const ROW_TERMINATOR: &[u8] = b"\r\n";

/// Whether a field must be quoted: it holds a comma, a quote or a CRLF.
#[inline]
pub fn needs_quoting(field: &[u8]) -> bool {
    memchr::memchr2(b',', b'"', field).is_some() || memmem::find(field, ROW_TERMINATOR).is_some()
}

/// Append `field` to `out`, quoting it and doubling inner quotes if needed.
pub fn escape_field(field: &[u8], out: &mut Vec<u8>) {
    if !needs_quoting(field) {
        out.extend_from_slice(field);
        return;
    }
    out.push(b'"');
    let mut start = 0;
    for pos in memchr::memchr_iter(b'"', field) {
        out.extend_from_slice(&field[start..=pos]);
        out.push(b'"');
        start = pos + 1;
    }
    out.extend_from_slice(&field[start..]);
    out.push(b'"');
}

/// Append one CSV row for a record.
pub fn encode_row(code: &[u8], url: &[u8], out: &mut Vec<u8>) {
    escape_field(url, out);
    out.push(b',');
    escape_field(code, out);
    out.extend_from_slice(b",,");
    out.extend_from_slice(ROW_TERMINATOR);
}

/// Convert every record of `input` to a CSV row. Blank lines are skipped.
/// Returns the number of rows written.
pub fn export_csv<R: BufRead, W: Write>(
    input: &mut LineReader<R>,
    out: &mut LineSink<W>,
) -> Result<u64> {
    let mut rows = 0u64;
    let mut scratch = Vec::with_capacity(512);

    loop {
        let line_no = input.line_number() + 1;
        let Some(line) = input.next_line()? else {
            break;
        };
        if line == b"\n" || line.is_empty() {
            continue;
        }
        let (code, url) =
            split_line(line).map_err(|kind| ParseError::new(kind, line_no, line))?;

        scratch.clear();
        encode_row(code.as_bytes(), url, &mut scratch);
        out.write_all(&scratch)?;
        rows += 1;
    }

    out.flush()?;
    info!(rows, "export complete");
    Ok(rows)
}
