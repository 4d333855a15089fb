use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpDatagram {
    pub source_port: u16,
    pub destination_port: u16,
    /// Header plus payload, as declared on the wire.
    pub length: u16,
    pub checksum: u16,
}

impl UdpDatagram {
    pub fn payload_len(&self) -> usize {
        usize::from(self.length) - layout::HEADER_LEN
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpLiteDatagram {
    pub source_port: u16,
    pub destination_port: u16,
    pub checksum_coverage: u16,
    pub checksum: u16,
    pub payload_len: usize,
}

/// Decode the header; the cursor is left at the first payload byte.
pub fn parse_udp(cursor: &mut ByteCursor<'_>) -> Result<UdpDatagram, ParseError> {
    let start = cursor.offset();
    let available = cursor.remaining();
    cursor.require_len(layout::HEADER_LEN)?;

    let source_port = cursor.read_u16_be()?;
    let destination_port = cursor.read_u16_be()?;
    let length = cursor.read_u16_be()?;
    let checksum = cursor.read_u16_be()?;

    let declared = usize::from(length);
    if declared < layout::HEADER_LEN || declared > available {
        return Err(ParseError::length(
            layout::LAYER,
            start,
            format!("datagram length {declared} outside {}..={available}", layout::HEADER_LEN),
        ));
    }

    Ok(UdpDatagram {
        source_port,
        destination_port,
        length,
        checksum,
    })
}

/// Decode the header of a datagram that fills the whole cursor region.
pub fn parse_udplite(cursor: &mut ByteCursor<'_>) -> Result<UdpLiteDatagram, ParseError> {
    let start = cursor.offset();
    let available = cursor.remaining();
    cursor.require_len(layout::HEADER_LEN)?;

    let source_port = cursor.read_u16_be()?;
    let destination_port = cursor.read_u16_be()?;
    let checksum_coverage = cursor.read_u16_be()?;
    let checksum = cursor.read_u16_be()?;

    let coverage = usize::from(checksum_coverage);
    if checksum_coverage != layout::FULL_COVERAGE
        && (coverage < layout::HEADER_LEN || coverage > available)
    {
        return Err(ParseError::length(
            layout::LITE_LAYER,
            start,
            format!(
                "checksum coverage {coverage} outside {}..={available}",
                layout::HEADER_LEN
            ),
        ));
    }

    Ok(UdpLiteDatagram {
        source_port,
        destination_port,
        checksum_coverage,
        checksum,
        payload_len: cursor.remaining(),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_udp, parse_udplite};
    use crate::protocols::common::ByteCursor;
    use crate::protocols::error::ParseErrorKind;
    use crate::protocols::udp::layout;

    #[test]
    fn parse_udp_header() {
        let bytes = [0x26, 0xab, 0x26, 0xab, 0x00, 0x0a, 0x00, 0x00, 0x01, 0x02, 0xee];
        let mut cursor = ByteCursor::new(&bytes, layout::LAYER);
        let datagram = parse_udp(&mut cursor).unwrap();
        assert_eq!(datagram.source_port, 9899);
        assert_eq!(datagram.destination_port, 9899);
        assert_eq!(datagram.payload_len(), 2);
        assert_eq!(cursor.offset(), 8);
    }

    #[test]
    fn udp_length_below_header_is_violation() {
        let bytes = [0x26, 0xab, 0x26, 0xab, 0x00, 0x07, 0x00, 0x00];
        let err = parse_udp(&mut ByteCursor::new(&bytes, layout::LAYER)).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::LengthViolation);
    }

    #[test]
    fn udp_length_past_buffer_is_violation() {
        let bytes = [0x26, 0xab, 0x26, 0xab, 0x00, 0x18, 0x00, 0x00, 0x00];
        let err = parse_udp(&mut ByteCursor::new(&bytes, layout::LAYER)).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::LengthViolation);
    }

    #[test]
    fn parse_udplite_header() {
        let bytes = [0x04, 0xd2, 0xeb, 0x35, 0x00, 0x09, 0x86, 0xaf, 0xc6, 0x45, 0x46];
        let datagram = parse_udplite(&mut ByteCursor::new(&bytes, layout::LITE_LAYER)).unwrap();
        assert_eq!(datagram.source_port, 1234);
        assert_eq!(datagram.destination_port, 60213);
        assert_eq!(datagram.checksum_coverage, 9);
        assert_eq!(datagram.payload_len, 3);
    }

    #[test]
    fn udplite_zero_coverage_is_accepted() {
        let bytes = [0x04, 0xd2, 0xeb, 0x35, 0x00, 0x00, 0x00, 0x00];
        let datagram = parse_udplite(&mut ByteCursor::new(&bytes, layout::LITE_LAYER)).unwrap();
        assert_eq!(datagram.payload_len, 0);
    }

    #[test]
    fn udplite_bad_coverage_is_violation() {
        for coverage in [1u8, 7, 12] {
            let bytes = [0x04, 0xd2, 0xeb, 0x35, 0x00, coverage, 0x00, 0x00, 0xaa, 0xbb, 0xcc];
            let err =
                parse_udplite(&mut ByteCursor::new(&bytes, layout::LITE_LAYER)).unwrap_err();
            assert_eq!(err.kind(), ParseErrorKind::LengthViolation);
            assert_eq!(err.layer(), "udplite");
        }
    }
}
