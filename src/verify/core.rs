/// Streaming sortedness check. Holds one code, never the file.
use std::cmp::Ordering;
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::common::io::{LineReader, open_input, require_input_file};
use crate::error::{Error, Result};
use crate::shorturl::{Code, compare_codes, decode_code};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub records: u64,
    pub last_code: Code,
}

/// Checks that codes arrive in non-decreasing order.
#[derive(Debug, Default)]
pub struct Verifier {
    last_code: Code,
    records: u64,
}

impl Verifier {
    pub fn new() -> Self {
        Verifier::default()
    }

    /// Check one raw line. `line_no` is only used for diagnostics.
    pub fn check_line(&mut self, line: &[u8], line_no: u64) -> Result<()> {
        let code = decode_code(line, line_no)?;
        if compare_codes(&self.last_code, &code) == Ordering::Greater {
            return Err(Error::Unsorted {
                previous: self.last_code,
                current: code,
                line: Some(line_no),
            });
        }
        self.last_code = code;
        self.records += 1;
        Ok(())
    }

    pub fn last_code(&self) -> Code {
        self.last_code
    }

    pub fn finish(self) -> VerifyReport {
        VerifyReport {
            records: self.records,
            last_code: self.last_code,
        }
    }
}

/// Verify every line of `reader`, stopping at the first violation.
pub fn verify_lines<R: BufRead>(reader: &mut LineReader<R>) -> Result<VerifyReport> {
    let mut verifier = Verifier::new();
    loop {
        let line_no = reader.line_number() + 1;
        match reader.next_line()? {
            Some(line) => verifier.check_line(line, line_no)?,
            None => break,
        }
    }
    Ok(verifier.finish())
}

/// Verify that the file at `path` is sorted.
pub fn verify_file(path: &Path) -> Result<VerifyReport> {
    require_input_file(path)?;
    let mut reader = open_input(path)?;
    let report = verify_lines(&mut reader)?;
    info!(
        records = report.records,
        path = %path.display(),
        "file is sorted"
    );
    Ok(report)
}
