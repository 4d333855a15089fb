use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreHeader {
    pub protocol: u16,
    pub checksum: Option<u16>,
    pub key: Option<u32>,
    pub sequence: Option<u32>,
}

impl GreHeader {
    pub fn header_len(&self) -> usize {
        let optional = [
            self.checksum.is_some(),
            self.key.is_some(),
            self.sequence.is_some(),
        ];
        layout::BASE_HEADER_LEN
            + optional.iter().filter(|present| **present).count() * layout::OPTIONAL_WORD_LEN
    }
}

pub fn parse_gre(cursor: &mut ByteCursor<'_>) -> Result<GreHeader, ParseError> {
    cursor.require_len(layout::BASE_HEADER_LEN)?;
    let flags = cursor.read_u16_be()?;
    let protocol = cursor.read_u16_be()?;

    let version = flags & layout::VERSION_MASK;
    if version != 0 {
        return Err(ParseError::unsupported(
            layout::LAYER,
            format!("GRE version {version}"),
        ));
    }

    let checksum = if flags & layout::FLAG_CHECKSUM != 0 {
        let checksum = cursor.read_u16_be()?;
        let _reserved = cursor.read_u16_be()?;
        Some(checksum)
    } else {
        None
    };
    let key = if flags & layout::FLAG_KEY != 0 {
        Some(cursor.read_u32_be()?)
    } else {
        None
    };
    let sequence = if flags & layout::FLAG_SEQUENCE != 0 {
        Some(cursor.read_u32_be()?)
    } else {
        None
    };

    Ok(GreHeader {
        protocol,
        checksum,
        key,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_gre;
    use crate::protocols::common::ByteCursor;
    use crate::protocols::error::ParseErrorKind;
    use crate::protocols::gre::layout;

    #[test]
    fn parse_plain_header() {
        let bytes = [0x00, 0x00, 0x08, 0x00, 0x45];
        let mut cursor = ByteCursor::new(&bytes, layout::LAYER);
        let header = parse_gre(&mut cursor).unwrap();
        assert_eq!(header.protocol, 0x0800);
        assert_eq!(header.header_len(), 4);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn parse_optional_words() {
        let bytes = [
            0xb0, 0x00, 0x86, 0xdd, // C, K, S
            0xab, 0xcd, 0x00, 0x00, // checksum + reserved
            0x00, 0x00, 0x00, 0x2a, // key
            0x00, 0x00, 0x00, 0x07, // sequence
        ];
        let header = parse_gre(&mut ByteCursor::new(&bytes, layout::LAYER)).unwrap();
        assert_eq!(header.checksum, Some(0xabcd));
        assert_eq!(header.key, Some(42));
        assert_eq!(header.sequence, Some(7));
        assert_eq!(header.header_len(), 16);
    }

    #[test]
    fn missing_key_word_is_truncated() {
        let bytes = [0x20, 0x00, 0x08, 0x00, 0x00, 0x00];
        let err = parse_gre(&mut ByteCursor::new(&bytes, layout::LAYER)).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Truncated);
    }

    #[test]
    fn pptp_version_is_unsupported() {
        let bytes = [0x30, 0x81, 0x88, 0x0b];
        let err = parse_gre(&mut ByteCursor::new(&bytes, layout::LAYER)).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnsupportedEncapsulation);
    }
}
