use super::layout;
use crate::protocols::common::ByteCursor;
use crate::protocols::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MplsEntry {
    pub label: u32,
    pub tc: u8,
    pub bottom_of_stack: bool,
    pub ttl: u8,
}

pub fn parse_mpls_entry(cursor: &mut ByteCursor<'_>) -> Result<MplsEntry, ParseError> {
    let word = cursor.read_u32_be()?;
    Ok(MplsEntry {
        label: word >> layout::LABEL_SHIFT,
        tc: ((word >> layout::TC_SHIFT) & layout::TC_MASK) as u8,
        bottom_of_stack: word & layout::BOTTOM_OF_STACK != 0,
        ttl: (word & layout::TTL_MASK) as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::{MplsEntry, parse_mpls_entry};
    use crate::protocols::common::ByteCursor;
    use crate::protocols::error::ParseErrorKind;
    use crate::protocols::mpls::layout;

    #[test]
    fn split_label_word() {
        let bytes = [0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
        let mut cursor = ByteCursor::new(&bytes, layout::LAYER);
        assert_eq!(
            parse_mpls_entry(&mut cursor).unwrap(),
            MplsEntry {
                label: 0,
                tc: 0,
                bottom_of_stack: false,
                ttl: 0,
            }
        );
        assert_eq!(
            parse_mpls_entry(&mut cursor).unwrap(),
            MplsEntry {
                label: 1_048_575,
                tc: 7,
                bottom_of_stack: true,
                ttl: 255,
            }
        );
    }

    #[test]
    fn partial_entry_is_truncated() {
        let bytes = [0x00, 0x01, 0x01];
        let err = parse_mpls_entry(&mut ByteCursor::new(&bytes, layout::LAYER)).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Truncated);
        assert_eq!(err.layer(), "mpls");
    }
}
