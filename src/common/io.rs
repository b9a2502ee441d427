use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Phase, Result};

/// 256KB read buffer: records are short, so this batches thousands per read().
const INPUT_BUF_SIZE: usize = 256 * 1024;

/// 4MB output buffer.
pub const OUTPUT_BUF_SIZE: usize = 4 * 1024 * 1024;

/// Name used in diagnostics for standard input/output.
const STDIO_NAME: &str = "-";

/// Open for reading without updating atime where the kernel allows it.
/// Files we do not own refuse `O_NOATIME` with EPERM; after the first such
/// refusal every later open goes straight to a plain `File::open`.
#[cfg(target_os = "linux")]
fn open_noatime(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    static NOATIME_ALLOWED: AtomicBool = AtomicBool::new(true);

    if !NOATIME_ALLOWED.load(Ordering::Relaxed) {
        return File::open(path);
    }
    fs::OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOATIME)
        .open(path)
        .or_else(|e| {
            if e.raw_os_error() != Some(libc::EPERM) {
                return Err(e);
            }
            NOATIME_ALLOWED.store(false, Ordering::Relaxed);
            File::open(path)
        })
}

#[cfg(not(target_os = "linux"))]
fn open_noatime(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Whether an error is a "try again" state rather than a failure.
#[inline]
pub fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// True if `path` exists and is a regular file (symlinks followed).
pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// True if anything exists at `path`, including a dangling symlink.
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Fail unless `path` names an existing regular file.
pub fn require_input_file(path: &Path) -> Result<()> {
    if is_regular_file(path) {
        Ok(())
    } else {
        Err(Error::Precondition(format!(
            "could not open in-file '{}'",
            path.display()
        )))
    }
}

/// Fail if anything already exists at `path`. Output files are never overwritten.
pub fn require_absent(path: &Path) -> Result<()> {
    if path_exists(path) {
        Err(Error::Precondition(format!(
            "out-file already exists '{}'",
            path.display()
        )))
    } else {
        Ok(())
    }
}

/// Outcome of a single read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// A complete line is available via [`LineReader::line`].
    Line,
    /// End of input.
    Eof,
    /// Nothing available yet; call again. Never counts as a line or as EOF.
    Again,
}

/// Newline-delimited reader that distinguishes EOF, transient states and
/// real errors. Lines keep their trailing `\n` (absent on an unterminated
/// last line).
pub struct LineReader<R> {
    inner: R,
    path: PathBuf,
    buf: Vec<u8>,
    line_no: u64,
    /// A previous attempt returned `Again` with part of a line in `buf`.
    partial: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        LineReader {
            inner,
            path: path.into(),
            buf: Vec::with_capacity(256),
            line_no: 0,
            partial: false,
        }
    }

    /// Attempt to read one line.
    pub fn read_line(&mut self) -> Result<ReadStatus> {
        if !self.partial {
            self.buf.clear();
        }
        match self.inner.read_until(b'\n', &mut self.buf) {
            Ok(0) if self.buf.is_empty() => {
                self.partial = false;
                Ok(ReadStatus::Eof)
            }
            Ok(_) => {
                self.partial = false;
                self.line_no += 1;
                Ok(ReadStatus::Line)
            }
            // read_until keeps whatever it consumed before failing
            Err(ref e) if is_transient(e) => {
                self.partial = true;
                Ok(ReadStatus::Again)
            }
            Err(e) => Err(Error::io(Phase::Read, &self.path, e)),
        }
    }

    /// Read the next line, retrying transient states. `None` at EOF.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        loop {
            match self.read_line()? {
                ReadStatus::Line => return Ok(Some(&self.buf)),
                ReadStatus::Eof => return Ok(None),
                ReadStatus::Again => continue,
            }
        }
    }

    /// The line produced by the last `ReadStatus::Line`.
    #[inline]
    pub fn line(&self) -> &[u8] {
        &self.buf
    }

    /// 1-based number of the last complete line.
    #[inline]
    pub fn line_number(&self) -> u64 {
        self.line_no
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Output writer enum to avoid Box<dyn Write> vtable dispatch overhead.
pub enum Output {
    Stdout(BufWriter<io::StdoutLock<'static>>),
    File(BufWriter<File>),
}

impl Write for Output {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(w) => w.write(buf),
            Output::File(w) => w.write(buf),
        }
    }
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Output::Stdout(w) => w.write_all(buf),
            Output::File(w) => w.write_all(buf),
        }
    }
    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(w) => w.flush(),
            Output::File(w) => w.flush(),
        }
    }
}

/// Writer half: retries transient states and wraps failures with the path.
pub struct LineSink<W: Write> {
    inner: W,
    path: PathBuf,
}

impl<W: Write> LineSink<W> {
    pub fn new(inner: W, path: impl Into<PathBuf>) -> Self {
        LineSink {
            inner,
            path: path.into(),
        }
    }

    /// Write all of `data`, retrying would-block and interrupted writes.
    pub fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            match self.inner.write(data) {
                Ok(0) => {
                    return Err(Error::io(
                        Phase::Write,
                        &self.path,
                        io::Error::from(io::ErrorKind::WriteZero),
                    ));
                }
                Ok(n) => data = &data[n..],
                Err(ref e) if is_transient(e) => continue,
                Err(e) => return Err(Error::io(Phase::Write, &self.path, e)),
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(ref e) if is_transient(e) => continue,
                Err(e) => return Err(Error::io(Phase::Write, &self.path, e)),
            }
        }
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open an existing file for line reading.
pub fn open_input(path: &Path) -> Result<LineReader<BufReader<File>>> {
    let file = open_noatime(path).map_err(|e| Error::io(Phase::Open, path, e))?;
    Ok(LineReader::new(
        BufReader::with_capacity(INPUT_BUF_SIZE, file),
        path,
    ))
}

/// Open `path`, or standard input when `path` is `None` or "-".
pub fn open_input_or_stdin(path: Option<&Path>) -> Result<LineReader<Box<dyn BufRead>>> {
    match path {
        Some(p) if p != Path::new(STDIO_NAME) => {
            let file = open_noatime(p).map_err(|e| Error::io(Phase::Open, p, e))?;
            Ok(LineReader::new(
                Box::new(BufReader::with_capacity(INPUT_BUF_SIZE, file)),
                p,
            ))
        }
        _ => Ok(LineReader::new(
            Box::new(BufReader::with_capacity(INPUT_BUF_SIZE, io::stdin().lock())),
            STDIO_NAME,
        )),
    }
}

/// Create a new output file. Fails if anything already exists at `path`.
pub fn create_output(path: &Path) -> Result<LineSink<Output>> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| Error::io(Phase::Open, path, e))?;
    Ok(LineSink::new(
        Output::File(BufWriter::with_capacity(OUTPUT_BUF_SIZE, file)),
        path,
    ))
}

pub fn stdout_sink() -> LineSink<Output> {
    LineSink::new(
        Output::Stdout(BufWriter::with_capacity(
            OUTPUT_BUF_SIZE,
            io::stdout().lock(),
        )),
        STDIO_NAME,
    )
}
