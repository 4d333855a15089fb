use std::net::Ipv4Addr;

use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Header length in bytes, options included.
    pub header_len: usize,
    pub total_len: usize,
    pub ttl: u8,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    pub fn payload_len(&self) -> usize {
        self.total_len - self.header_len
    }
}

/// Decode the header at the cursor; the cursor is left at the first payload byte.
pub fn parse_ipv4(cursor: &mut ByteCursor<'_>) -> Result<Ipv4Header, ParseError> {
    let start = cursor.offset();
    let available = cursor.remaining();
    cursor.require_len(layout::MIN_HEADER_LEN)?;

    let version_ihl = cursor.read_u8()?;
    let version = version_ihl >> 4;
    if version != layout::VERSION {
        return Err(ParseError::unsupported(
            layout::LAYER,
            format!("IP version {version} where IPv4 was expected"),
        ));
    }
    let header_len = usize::from(version_ihl & layout::IHL_MASK) * layout::IHL_UNIT;
    if header_len < layout::MIN_HEADER_LEN {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!("header length {header_len} below {}", layout::MIN_HEADER_LEN),
        ));
    }

    let _tos = cursor.read_u8()?;
    let total_len = usize::from(cursor.read_u16_be()?);
    if total_len < header_len {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!("total length {total_len} shorter than header length {header_len}"),
        ));
    }
    if total_len > available {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!("total length {total_len} exceeds {available} available bytes"),
        ));
    }

    cursor.take(layout::FRAGMENT_FIELDS_LEN)?;
    let ttl = cursor.read_u8()?;
    let protocol = cursor.read_u8()?;
    cursor.take(layout::CHECKSUM_LEN)?;
    let source = Ipv4Addr::from(cursor.read_array::<{ layout::ADDR_LEN }>()?);
    let destination = Ipv4Addr::from(cursor.read_array::<{ layout::ADDR_LEN }>()?);
    cursor.take(header_len - layout::MIN_HEADER_LEN)?;

    Ok(Ipv4Header {
        header_len,
        total_len,
        ttl,
        protocol,
        source,
        destination,
    })
}
