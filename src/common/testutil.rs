//! Readers that misbehave on purpose.

use std::io::{self, BufRead, Cursor, Read};

/// Serves at most `chunk` bytes per fill and fails every other fill with
/// `WouldBlock`, so lines arrive split across "try again" states.
pub struct FlakyReader {
    inner: Cursor<Vec<u8>>,
    chunk: usize,
    calls: u64,
}

impl FlakyReader {
    pub fn new(data: &[u8], chunk: usize) -> Self {
        FlakyReader {
            inner: Cursor::new(data.to_vec()),
            chunk: chunk.max(1),
            calls: 0,
        }
    }
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for FlakyReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.calls += 1;
        if self.calls % 2 == 1 {
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        let chunk = self.chunk;
        let buf = self.inner.fill_buf()?;
        Ok(&buf[..buf.len().min(chunk)])
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}
