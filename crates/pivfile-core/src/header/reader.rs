use std::ops::Range;

use super::error::HeaderError;

/// Bounds-checked little-endian access to a header byte prefix.
pub struct HeaderReader<'a> {
    bytes: &'a [u8],
}

impl<'a> HeaderReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), HeaderError> {
        if self.bytes.len() < needed {
            return Err(HeaderError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, HeaderError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(HeaderError::TooShort {
                needed: offset + 1,
                actual: self.bytes.len(),
            })
    }

    pub fn read_i16_le(&self, range: Range<usize>) -> Result<i16, HeaderError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(i16::from_le_bytes(bytes))
    }

    pub fn read_i32_le(&self, range: Range<usize>) -> Result<i32, HeaderError> {
        let bytes = self.read_array::<4>(range)?;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn read_f32_le(&self, range: Range<usize>) -> Result<f32, HeaderError> {
        let bytes = self.read_array::<4>(range)?;
        Ok(f32::from_le_bytes(bytes))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], HeaderError> {
        self.bytes.get(range.clone()).ok_or(HeaderError::TooShort {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }

    /// Fixed-width C string: stops at the first NUL, lossy UTF-8.
    pub fn read_c_string(&self, range: Range<usize>) -> Result<String, HeaderError> {
        let bytes = self.read_slice(range)?;
        Ok(c_string(bytes))
    }

    fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], HeaderError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| HeaderError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }
}

pub(crate) fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}
