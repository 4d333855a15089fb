use super::super::error::ParseError;

/// Bounds-checked read cursor over a borrowed byte slice.
///
/// The cursor remembers the absolute offset of its slice inside the original
/// packet buffer so errors always point at the real position, and carries
/// the name of the layer it decodes for error attribution.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
    layer: &'static str,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8], layer: &'static str) -> Self {
        Self::at(bytes, 0, layer)
    }

    /// Cursor over `bytes`, which start at absolute offset `base`.
    pub fn at(bytes: &'a [u8], base: usize, layer: &'static str) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
            layer,
        }
    }

    pub fn layer(&self) -> &'static str {
        self.layer
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ParseError> {
        if self.remaining() < needed {
            return Err(ParseError::Truncated {
                layer: self.layer,
                offset: self.offset(),
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.require_len(n)?;
        let bytes = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Take everything left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let bytes = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        bytes
    }

    /// Advance by up to `n` bytes without failing; returns how many were skipped.
    pub fn skip_clamped(&mut self, n: usize) -> usize {
        let n = n.min(self.remaining());
        self.pos += n;
        n
    }

    /// Split off the next `n` bytes as an independent cursor for a nested layer.
    pub fn split(&mut self, n: usize, layer: &'static str) -> Result<ByteCursor<'a>, ParseError> {
        let base = self.offset();
        let bytes = self.take(n)?;
        Ok(ByteCursor::at(bytes, base, layer))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16, ParseError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn peek_u8(&self) -> Result<u8, ParseError> {
        self.clone().read_u8()
    }

    pub fn peek_u16_be(&self) -> Result<u16, ParseError> {
        self.clone().read_u16_be()
    }

    pub fn peek_u32_be(&self) -> Result<u32, ParseError> {
        self.clone().read_u32_be()
    }
}
