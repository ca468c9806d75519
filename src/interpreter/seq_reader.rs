//! Sequential-only reads over decoded stream data.

use crate::error::{Error, Result};
use std::io::Read;

/// Size of each chunk pulled by [`SeqReader::read_to_end`].
const CHUNK_SIZE: usize = 8192;

/// Offset-addressed reader that only allows contiguous reads.
///
/// `read_at` must be called with the offset where the previous read ended.
/// Any other offset fails with [`Error::NonSequentialRead`].
pub struct SeqReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> SeqReader<R> {
    /// Wrap `inner`, starting at offset 0.
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Offset the next read must start at.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Fill `buf` from `offset`. Returns fewer bytes than `buf.len()` only at
    /// end of input.
    pub fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset != self.offset {
            return Err(Error::NonSequentialRead {
                expected: self.offset,
                actual: offset,
            });
        }

        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }

    /// Read everything that is left.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let n = self.read_at(&mut chunk, self.offset)?;
            out.extend_from_slice(&chunk[..n]);
            if n < chunk.len() {
                return Ok(out);
            }
        }
    }
}
