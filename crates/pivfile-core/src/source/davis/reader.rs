use super::error::DavisError;

/// Forward cursor over the bytes of one file.
pub struct DavisReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DavisReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], DavisError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DavisError::Truncated {
                context,
                needed: len,
                actual: self.remaining(),
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Fail with `Truncated` unless `len` more bytes are available.
    pub fn require(&self, len: usize, context: &'static str) -> Result<(), DavisError> {
        if len > self.remaining() {
            return Err(DavisError::Truncated {
                context,
                needed: len,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, DavisError> {
        Ok(self.take(1, context)?[0])
    }

    pub fn read_i8(&mut self, context: &'static str) -> Result<i8, DavisError> {
        Ok(i8::from_le_bytes([self.read_u8(context)?]))
    }

    pub fn read_u16_le(&mut self, context: &'static str) -> Result<u16, DavisError> {
        let bytes = self.take(2, context)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i32_le(&mut self, context: &'static str) -> Result<i32, DavisError> {
        let bytes = self.take(4, context)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_words(&mut self, out: &mut [u16], context: &'static str) -> Result<(), DavisError> {
        let bytes = self.take(byte_len(out.len(), 2)?, context)?;
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *value = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(())
    }

    pub fn read_floats(&mut self, out: &mut [f32], context: &'static str) -> Result<(), DavisError> {
        let bytes = self.take(byte_len(out.len(), 4)?, context)?;
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(())
    }

    /// One byte per pixel, widened to words.
    pub fn read_byte_words(
        &mut self,
        out: &mut [u16],
        context: &'static str,
    ) -> Result<(), DavisError> {
        let bytes = self.take(out.len(), context)?;
        for (value, byte) in out.iter_mut().zip(bytes) {
            *value = u16::from(*byte);
        }
        Ok(())
    }
}

pub fn byte_len(count: usize, width: usize) -> Result<usize, DavisError> {
    count.checked_mul(width).ok_or(DavisError::Allocation { bytes: usize::MAX })
}

/// Zero-filled vector of `len` elements, reporting allocation failure.
pub fn allocate<T: Clone + Default>(len: usize) -> Result<Vec<T>, DavisError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| DavisError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    values.resize(len, T::default());
    Ok(values)
}

/// Bytes up to the first NUL, lossy UTF-8.
pub fn until_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
