//! Error taxonomy shared by every tool.
//!
//! All variants are terminal for the current run. The only condition the
//! tools retry is a transient "try again" I/O state, which never surfaces
//! here (see [`crate::common::io::ReadStatus::Again`]).

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shorturl::{Code, ParseError};

pub type Result<T> = std::result::Result<T, Error>;

/// Which phase of file handling an I/O error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Read,
    Write,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Open => "open",
            Phase::Read => "read",
            Phase::Write => "write",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// `current` sorts before `previous`. With a line number it comes from
    /// the verifier; without one the sorter's window was too small.
    #[error("{}", unsorted_message(.previous, .current, .line))]
    Unsorted {
        previous: Code,
        current: Code,
        line: Option<u64>,
    },

    #[error("cannot {phase} '{}': {}", .path.display(), crate::common::io_error_msg(.source))]
    Io {
        phase: Phase,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Precondition(String),
}

fn unsorted_message(previous: &Code, current: &Code, line: &Option<u64>) -> String {
    match line {
        Some(line) => format!("line {}: code {} after code {}", line, current, previous),
        None => format!(
            "code {} after code {}: the window size is too small for this input",
            current, previous
        ),
    }
}

impl Error {
    pub fn io(phase: Phase, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            phase,
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this failure. Usage errors never get here;
    /// clap exits with status 2 on its own.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
