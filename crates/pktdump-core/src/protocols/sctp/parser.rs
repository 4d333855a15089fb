use super::chunk::{SctpChunk, decode_chunk};
use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::common::tlv::{TlvFraming, TlvIter, TlvRecord};
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SctpCommonHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub verification_tag: u32,
    pub checksum: u32,
}

pub fn parse_common_header(cursor: &mut ByteCursor<'_>) -> Result<SctpCommonHeader, ParseError> {
    cursor.require_len(layout::COMMON_HEADER_LEN)?;
    Ok(SctpCommonHeader {
        source_port: cursor.read_u16_be()?,
        destination_port: cursor.read_u16_be()?,
        verification_tag: cursor.read_u32_be()?,
        checksum: cursor.read_u32_be()?,
    })
}

/// Decode every chunk left in the cursor region.
pub fn parse_chunks(cursor: &mut ByteCursor<'_>) -> Result<Vec<SctpChunk>, ParseError> {
    let region = cursor.split(cursor.remaining(), layout::CHUNK_LAYER)?;
    TlvIter::new(region, TlvFraming::SCTP_CHUNK)
        .map(|record| record.and_then(|record| decode_chunk(&record, 0)))
        .collect()
}

pub(super) fn value_cursor<'a>(record: &TlvRecord<'a>, layer: &'static str) -> ByteCursor<'a> {
    ByteCursor::at(record.value, record.value_offset(), layer)
}

/// Records nested past [`layout::MAX_NESTING_DEPTH`] are a length violation,
/// which keeps decoding and rendering recursion bounded.
pub(super) fn require_depth(
    record: &TlvRecord<'_>,
    depth: usize,
    layer: &'static str,
) -> Result<(), ParseError> {
    if depth > layout::MAX_NESTING_DEPTH {
        return Err(ParseError::length(
            layer,
            record.offset,
            format!(
                "records nested more than {} levels deep",
                layout::MAX_NESTING_DEPTH
            ),
        ));
    }
    Ok(())
}

pub(super) fn require_exact_len(
    record: &TlvRecord<'_>,
    expected: usize,
    layer: &'static str,
) -> Result<(), ParseError> {
    let declared = usize::from(record.length);
    if declared != expected {
        return Err(ParseError::length(
            layer,
            record.offset,
            format!(
                "type 0x{:02x} declares length {declared}, expected {expected}",
                record.type_code
            ),
        ));
    }
    Ok(())
}

pub(super) fn require_min_len(
    record: &TlvRecord<'_>,
    min: usize,
    layer: &'static str,
) -> Result<(), ParseError> {
    let declared = usize::from(record.length);
    if declared < min {
        return Err(ParseError::length(
            layer,
            record.offset,
            format!(
                "type 0x{:02x} declares length {declared}, minimum {min}",
                record.type_code
            ),
        ));
    }
    Ok(())
}

/// Check that what is left of a record value is a whole number of `unit`-byte entries.
pub(super) fn require_entries(
    cursor: &ByteCursor<'_>,
    unit: usize,
    record: &TlvRecord<'_>,
) -> Result<usize, ParseError> {
    let remaining = cursor.remaining();
    if remaining % unit != 0 {
        return Err(ParseError::length(
            cursor.layer(),
            record.offset,
            format!(
                "type 0x{:02x} carries {remaining} bytes, not a multiple of {unit}",
                record.type_code
            ),
        ));
    }
    Ok(remaining / unit)
}
