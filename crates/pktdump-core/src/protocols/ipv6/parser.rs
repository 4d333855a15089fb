use std::net::Ipv6Addr;

use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Header {
    pub payload_len: usize,
    pub next_header: u8,
    pub hop_limit: u8,
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
}

pub fn parse_ipv6(cursor: &mut ByteCursor<'_>) -> Result<Ipv6Header, ParseError> {
    let start = cursor.offset();
    cursor.require_len(layout::HEADER_LEN)?;

    let version = cursor.peek_u8()? >> 4;
    if version != layout::VERSION {
        return Err(ParseError::unsupported(
            layout::LAYER,
            format!("IP version {version} where IPv6 was expected"),
        ));
    }
    cursor.take(layout::FLOW_WORD_LEN)?;
    let payload_len = usize::from(cursor.read_u16_be()?);
    let next_header = cursor.read_u8()?;
    let hop_limit = cursor.read_u8()?;
    let source = Ipv6Addr::from(cursor.read_array::<{ layout::ADDR_LEN }>()?);
    let destination = Ipv6Addr::from(cursor.read_array::<{ layout::ADDR_LEN }>()?);

    if payload_len > cursor.remaining() {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!(
                "payload length {payload_len} exceeds {} available bytes",
                cursor.remaining()
            ),
        ));
    }

    Ok(Ipv6Header {
        payload_len,
        next_header,
        hop_limit,
        source,
        destination,
    })
}
