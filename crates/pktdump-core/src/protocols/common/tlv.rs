//! Padded type-length-value iteration.
//!
//! Used for SCTP chunks (1-byte type, 1-byte flags, 2-byte length) and SCTP
//! parameters / error causes (2-byte type, 2-byte length). The declared
//! length covers the 4-byte header and the value but not the padding.

use super::super::error::ParseError;
use super::cursor::ByteCursor;

pub const TLV_HEADER_LEN: usize = 4;

/// Width of the type field in front of the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeField {
    /// 1-byte type followed by 1-byte flags.
    NarrowWithFlags,
    /// 2-byte type, no flags.
    Wide,
}

#[derive(Debug, Clone, Copy)]
pub struct TlvFraming {
    pub type_field: TypeField,
    pub min_len: usize,
    pub align: usize,
}

impl TlvFraming {
    pub const SCTP_CHUNK: TlvFraming = TlvFraming {
        type_field: TypeField::NarrowWithFlags,
        min_len: TLV_HEADER_LEN,
        align: 4,
    };

    pub const SCTP_PARAMETER: TlvFraming = TlvFraming {
        type_field: TypeField::Wide,
        min_len: TLV_HEADER_LEN,
        align: 4,
    };

    fn padded(&self, len: usize) -> usize {
        len.div_ceil(self.align) * self.align
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvRecord<'a> {
    pub type_code: u16,
    pub flags: u8,
    pub length: u16,
    pub value: &'a [u8],
    /// Absolute offset of the record header.
    pub offset: usize,
}

impl TlvRecord<'_> {
    /// Absolute offset of the first value byte.
    pub fn value_offset(&self) -> usize {
        self.offset + TLV_HEADER_LEN
    }
}

/// Lazy, fused iterator over the records of one TLV region.
///
/// The region must be consumed exactly: a leftover that cannot hold another
/// header is an error. Padding after the final record may be missing.
pub struct TlvIter<'a> {
    cursor: ByteCursor<'a>,
    framing: TlvFraming,
    failed: bool,
}

impl<'a> TlvIter<'a> {
    pub fn new(cursor: ByteCursor<'a>, framing: TlvFraming) -> Self {
        Self {
            cursor,
            framing,
            failed: false,
        }
    }

    fn step(&mut self) -> Result<TlvRecord<'a>, ParseError> {
        let layer = self.cursor.layer();
        let offset = self.cursor.offset();
        let available = self.cursor.remaining();
        if available < TLV_HEADER_LEN {
            return Err(ParseError::length(
                layer,
                offset,
                format!("{available} trailing bytes cannot hold a {TLV_HEADER_LEN}-byte header"),
            ));
        }

        let (type_code, flags) = match self.framing.type_field {
            TypeField::NarrowWithFlags => {
                let type_code = self.cursor.read_u8()?;
                (u16::from(type_code), self.cursor.read_u8()?)
            }
            TypeField::Wide => (self.cursor.read_u16_be()?, 0),
        };
        let length = self.cursor.read_u16_be()?;
        let declared = usize::from(length);
        if declared < self.framing.min_len {
            return Err(ParseError::length(
                layer,
                offset,
                format!(
                    "declared length {declared} below minimum {}",
                    self.framing.min_len
                ),
            ));
        }
        if declared > available {
            return Err(ParseError::length(
                layer,
                offset,
                format!("declared length {declared} exceeds {available} remaining bytes"),
            ));
        }

        let value = self.cursor.take(declared - TLV_HEADER_LEN)?;
        self.cursor
            .skip_clamped(self.framing.padded(declared) - declared);

        Ok(TlvRecord {
            type_code,
            flags,
            length,
            value,
            offset,
        })
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = Result<TlvRecord<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }
        let record = self.step();
        if record.is_err() {
            self.failed = true;
        }
        Some(record)
    }
}
