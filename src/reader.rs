use byteorder::{ByteOrder, LittleEndian as LE};

use crate::{Error, Guid, Result};

/// Cursor over an in-memory save image.
///
/// All multi-byte reads are little-endian. Every read is bounds-checked and
/// fails with [`Error::EndOfData`] rather than panicking, since a truncated
/// file must surface as a parse error.
pub struct SaveReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SaveReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::EndOfData {
                requested: pos - self.pos.min(pos),
                available: self.remaining(),
                offset: self.pos,
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::EndOfData {
                requested: count,
                available: self.remaining(),
                offset: self.pos,
            });
        }
        let out = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(out)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.take(count).map(|b| b.to_vec())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LE::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LE::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LE::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LE::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LE::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LE::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LE::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LE::read_f64(self.take(8)?))
    }

    /// Boolean stored as a full 32-bit word, used outside the property system.
    pub fn read_bool32(&mut self) -> Result<bool> {
        Ok(self.read_u32()? != 0)
    }

    /// Boolean stored as a 16-bit word, the ASA BoolProperty placeholder.
    pub fn read_bool16(&mut self) -> Result<bool> {
        Ok(self.read_u16()? != 0)
    }

    /// Boolean stored as a single byte, the ASE BoolProperty placeholder.
    pub fn read_bool8(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_guid(&mut self) -> Result<Guid> {
        let bytes = self.take(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(Guid::from_bytes(raw))
    }

    /// Length-prefixed string.
    ///
    /// A signed 32-bit length `N` is followed by the string bytes including a
    /// trailing NUL. `N > 0` is single-byte text, `N < 0` is `|N|` UTF-16LE
    /// code units. `N == 0` is the empty string with no payload at all.
    pub fn read_fstring(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len > 0 {
            let len = len as usize;
            if len > self.remaining() {
                return Err(Error::Corrupt(format!(
                    "string length {} exceeds remaining {} bytes at offset {}",
                    len,
                    self.remaining(),
                    self.pos - 4,
                )));
            }
            let bytes = self.take(len)?;
            let content = bytes.strip_suffix(&[0]).unwrap_or(bytes);
            Ok(String::from_utf8_lossy(content).into_owned())
        } else {
            let units = len.unsigned_abs() as usize;
            let byte_len = units * 2;
            if byte_len > self.remaining() {
                return Err(Error::Corrupt(format!(
                    "UTF-16 string length {} exceeds remaining {} bytes at offset {}",
                    byte_len,
                    self.remaining(),
                    self.pos - 4,
                )));
            }
            let bytes = self.take(byte_len)?;
            let mut chars = Vec::with_capacity(units);
            for pair in bytes.chunks_exact(2) {
                chars.push(LE::read_u16(pair));
            }
            if chars.last() == Some(&0) {
                chars.pop();
            }
            Ok(String::from_utf16_lossy(&chars))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fstring(s: &str) -> Vec<u8> {
        let mut out = ((s.len() + 1) as i32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out.push(0);
        out
    }

    #[test]
    fn primitive_reads_are_little_endian() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3f];
        let mut r = SaveReader::new(&data);
        assert_eq!(r.read_i32().unwrap(), 1);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn read_past_end_fails() {
        let mut r = SaveReader::new(&[1, 2]);
        match r.read_u32() {
            Err(Error::EndOfData {
                requested: 4,
                available: 2,
                ..
            }) => {}
            other => panic!("expected EndOfData, got {other:?}"),
        }
    }

    #[test]
    fn fstring_ascii_round_trip() {
        let data = fstring("TribeName");
        let mut r = SaveReader::new(&data);
        assert_eq!(r.read_fstring().unwrap(), "TribeName");
        // prefix + N bytes, nothing more
        assert_eq!(r.tell(), 4 + 10);
    }

    #[test]
    fn fstring_empty_variants() {
        // N == 0: no payload
        let zero = 0i32.to_le_bytes();
        let mut r = SaveReader::new(&zero);
        assert_eq!(r.read_fstring().unwrap(), "");

        // N == 1: a single NUL
        let data = [1, 0, 0, 0, 0];
        let mut r = SaveReader::new(&data);
        assert_eq!(r.read_fstring().unwrap(), "");

        // N == -1: a single UTF-16 NUL
        let mut data = (-1i32).to_le_bytes().to_vec();
        data.extend_from_slice(&[0, 0]);
        let mut r = SaveReader::new(&data);
        assert_eq!(r.read_fstring().unwrap(), "");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn fstring_utf16() {
        let text = "日本語";
        let units: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
        let mut data = (-(units.len() as i32)).to_le_bytes().to_vec();
        for u in &units {
            data.extend_from_slice(&u.to_le_bytes());
        }
        let mut r = SaveReader::new(&data);
        assert_eq!(r.read_fstring().unwrap(), text);
    }

    #[test]
    fn fstring_absurd_length_is_corrupt() {
        let mut data = i32::MAX.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 8]);
        let mut r = SaveReader::new(&data);
        assert!(matches!(r.read_fstring(), Err(Error::Corrupt(_))));
    }

    #[test]
    fn seek_and_tell() {
        let data = [0u8; 16];
        let mut r = SaveReader::new(&data);
        r.seek(8).unwrap();
        assert_eq!(r.tell(), 8);
        assert_eq!(r.remaining(), 8);
        assert!(r.seek(17).is_err());
    }
}
