use bitflags::bitflags;

use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

bitflags! {
    /// Control bits from byte 13 of the header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TcpFlags: u8 {
        const FIN = 0x01;
        const SYN = 0x02;
        const RST = 0x04;
        const PSH = 0x08;
        const ACK = 0x10;
        const URG = 0x20;
        const ECE = 0x40;
        const CWR = 0x80;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpOption {
    EndOfList,
    NoOp,
    Mss(u16),
    WindowScale(u8),
    SackPermitted,
    /// Left and right edges of each SACK block.
    Sack(Vec<(u32, u32)>),
    Timestamp { value: u32, echo_reply: u32 },
    /// TCP Fast Open; an empty cookie is a cookie request.
    FastOpen(Vec<u8>),
    Unknown { kind: u8, length: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSegment {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence: u32,
    pub acknowledgment: u32,
    pub header_len: usize,
    pub flags: TcpFlags,
    pub window: u16,
    pub options: Vec<TcpOption>,
    pub payload_len: usize,
}

/// Decode a segment that occupies the whole cursor region.
pub fn parse_tcp(cursor: &mut ByteCursor<'_>) -> Result<TcpSegment, ParseError> {
    let start = cursor.offset();
    let available = cursor.remaining();
    cursor.require_len(layout::MIN_HEADER_LEN)?;

    let source_port = cursor.read_u16_be()?;
    let destination_port = cursor.read_u16_be()?;
    let sequence = cursor.read_u32_be()?;
    let acknowledgment = cursor.read_u32_be()?;
    let header_len =
        usize::from(cursor.read_u8()? >> layout::DATA_OFFSET_SHIFT) * layout::DATA_OFFSET_UNIT;
    if header_len < layout::MIN_HEADER_LEN {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!("data offset {header_len} below {}", layout::MIN_HEADER_LEN),
        ));
    }
    if header_len > available {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!("data offset {header_len} exceeds {available} available bytes"),
        ));
    }
    let flags = TcpFlags::from_bits_retain(cursor.read_u8()?);
    let window = cursor.read_u16_be()?;
    cursor.take(layout::TRAILING_FIELDS_LEN)?;

    let options_region = cursor.split(header_len - layout::MIN_HEADER_LEN, layout::OPTION_LAYER)?;
    let options = parse_options(options_region)?;
    let payload_len = cursor.take_rest().len();

    Ok(TcpSegment {
        source_port,
        destination_port,
        sequence,
        acknowledgment,
        header_len,
        flags,
        window,
        options,
        payload_len,
    })
}

fn parse_options(mut cursor: ByteCursor<'_>) -> Result<Vec<TcpOption>, ParseError> {
    let mut options = Vec::new();
    while !cursor.is_empty() {
        let offset = cursor.offset();
        let kind = cursor.read_u8()?;
        match kind {
            layout::OPT_EOL => {
                options.push(TcpOption::EndOfList);
                continue;
            }
            layout::OPT_NOP => {
                options.push(TcpOption::NoOp);
                continue;
            }
            _ => {}
        }

        let length = cursor.read_u8()?;
        let declared = usize::from(length);
        if declared < layout::OPT_HEADER_LEN {
            return Err(ParseError::length(
                layout::OPTION_LAYER,
                offset,
                format!("option {kind} declares length {declared}"),
            ));
        }
        if declared - layout::OPT_HEADER_LEN > cursor.remaining() {
            return Err(ParseError::length(
                layout::OPTION_LAYER,
                offset,
                format!("option {kind} length {declared} runs past the options region"),
            ));
        }
        let mut body = cursor.split(declared - layout::OPT_HEADER_LEN, layout::OPTION_LAYER)?;
        let exact = |expected: usize| -> Result<(), ParseError> {
            if declared != expected {
                return Err(ParseError::length(
                    layout::OPTION_LAYER,
                    offset,
                    format!("option {kind} length {declared}, expected {expected}"),
                ));
            }
            Ok(())
        };

        let option = match kind {
            layout::OPT_MSS => {
                exact(layout::OPT_MSS_LEN)?;
                TcpOption::Mss(body.read_u16_be()?)
            }
            layout::OPT_WINDOW_SCALE => {
                exact(layout::OPT_WINDOW_SCALE_LEN)?;
                TcpOption::WindowScale(body.read_u8()?)
            }
            layout::OPT_SACK_PERMITTED => {
                exact(layout::OPT_SACK_PERMITTED_LEN)?;
                TcpOption::SackPermitted
            }
            layout::OPT_SACK => {
                let blocks = body.remaining();
                if blocks == 0 || blocks % layout::SACK_BLOCK_LEN != 0 {
                    return Err(ParseError::length(
                        layout::OPTION_LAYER,
                        offset,
                        format!("SACK option length {declared} is not 2 + 8n"),
                    ));
                }
                let mut edges = Vec::with_capacity(blocks / layout::SACK_BLOCK_LEN);
                while !body.is_empty() {
                    edges.push((body.read_u32_be()?, body.read_u32_be()?));
                }
                TcpOption::Sack(edges)
            }
            layout::OPT_TIMESTAMP => {
                exact(layout::OPT_TIMESTAMP_LEN)?;
                TcpOption::Timestamp {
                    value: body.read_u32_be()?,
                    echo_reply: body.read_u32_be()?,
                }
            }
            layout::OPT_FAST_OPEN => TcpOption::FastOpen(body.take_rest().to_vec()),
            _ => TcpOption::Unknown { kind, length },
        };
        options.push(option);
    }
    Ok(options)
}
