use std::io::Read;

use byteorder::{ByteOrder, LittleEndian as LE};
use flate2::read::ZlibDecoder;

use crate::{Error, Result};

/// Streaming decoder for the run-length layer inside ASA object blobs.
///
/// The encoded stream is a sequence of chunks: a positive i32 `N` followed by
/// `N` literal bytes, or a negative i32 whose magnitude is a run of zero
/// bytes. Output stops at the declared uncompressed length, so sparse blobs
/// expand lazily instead of materializing the intermediate stage.
pub struct RleReader<R: Read> {
    inner: R,
    remaining_out: u64,
    state: Chunk,
}

enum Chunk {
    Idle,
    Literal(u32),
    Zeros(u32),
}

impl<R: Read> RleReader<R> {
    pub fn new(inner: R, uncompressed_len: u64) -> Self {
        Self {
            inner,
            remaining_out: uncompressed_len,
            state: Chunk::Idle,
        }
    }

    fn next_chunk(&mut self) -> std::io::Result<()> {
        let mut prefix = [0u8; 4];
        self.inner.read_exact(&mut prefix)?;
        let len = LE::read_i32(&prefix);
        self.state = if len >= 0 {
            Chunk::Literal(len as u32)
        } else {
            Chunk::Zeros(len.unsigned_abs())
        };
        Ok(())
    }
}

impl<R: Read> Read for RleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() || self.remaining_out == 0 {
            return Ok(0);
        }
        loop {
            match self.state {
                Chunk::Idle => self.next_chunk()?,
                Chunk::Literal(0) | Chunk::Zeros(0) => self.state = Chunk::Idle,
                Chunk::Literal(ref mut n) => {
                    let want = (*n as u64)
                        .min(self.remaining_out)
                        .min(buf.len() as u64) as usize;
                    let read = self.inner.read(&mut buf[..want])?;
                    if read == 0 {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "literal run truncated",
                        ));
                    }
                    *n -= read as u32;
                    self.remaining_out -= read as u64;
                    return Ok(read);
                }
                Chunk::Zeros(ref mut n) => {
                    let take = (*n as u64)
                        .min(self.remaining_out)
                        .min(buf.len() as u64) as usize;
                    buf[..take].fill(0);
                    *n -= take as u32;
                    self.remaining_out -= take as u64;
                    return Ok(take);
                }
            }
        }
    }
}

/// Expand an ASA object blob: a u32 uncompressed length, then a zlib stream
/// whose inflation is the run-length stream decoded by [`RleReader`].
pub fn decompress_blob(blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < 4 {
        return Err(Error::Corrupt(format!(
            "object blob of {} bytes has no length header",
            blob.len()
        )));
    }
    let uncompressed_len = LE::read_u32(&blob[..4]) as u64;
    const MAX_BLOB: u64 = 256 * 1024 * 1024;
    if uncompressed_len > MAX_BLOB {
        return Err(Error::Corrupt(format!(
            "object blob declares {uncompressed_len} uncompressed bytes"
        )));
    }

    let zlib = ZlibDecoder::new(&blob[4..]);
    let mut rle = RleReader::new(zlib, uncompressed_len);
    let mut out = Vec::with_capacity(uncompressed_len as usize);
    rle.read_to_end(&mut out)?;
    if out.len() as u64 != uncompressed_len {
        return Err(Error::Corrupt(format!(
            "object blob expanded to {} bytes, declared {}",
            out.len(),
            uncompressed_len
        )));
    }
    Ok(out)
}
