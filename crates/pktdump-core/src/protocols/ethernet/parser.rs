use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub destination: [u8; layout::MAC_LEN],
    pub source: [u8; layout::MAC_LEN],
    pub ethertype: u16,
}

pub fn parse_ethernet(cursor: &mut ByteCursor<'_>) -> Result<EthernetFrame, ParseError> {
    cursor.require_len(layout::HEADER_LEN)?;
    let destination = cursor.read_array()?;
    let source = cursor.read_array()?;
    let ethertype = cursor.read_u16_be()?;
    Ok(EthernetFrame {
        destination,
        source,
        ethertype,
    })
}
