use thiserror::Error;

/// Coarse classification of a [`ParseError`], convenient for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    Truncated,
    LengthViolation,
    UnsupportedEncapsulation,
}

/// Reason a buffer could not be decoded into a layer stack.
///
/// Exactly one error is produced per failed parse; it names the protocol
/// layer that rejected the bytes and, where meaningful, the absolute offset
/// in the original buffer.
///
/// # Examples
/// ```
/// use pktdump_core::{FrameHint, Packet, ParseErrorKind};
///
/// let err = Packet::parse(vec![0x45, 0x00], FrameHint::Ipv4, None).unwrap_err();
/// assert_eq!(err.kind(), ParseErrorKind::Truncated);
/// assert_eq!(err.layer(), "ipv4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{layer}: truncated at offset {offset}: need {needed} bytes, got {available}")]
    Truncated {
        layer: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("{layer}: length violation at offset {offset}: {reason}")]
    LengthViolation {
        layer: &'static str,
        offset: usize,
        reason: String,
    },
    #[error("{layer}: unsupported encapsulation: {detail}")]
    UnsupportedEncapsulation { layer: &'static str, detail: String },
}

impl ParseError {
    pub(crate) fn length(layer: &'static str, offset: usize, reason: impl Into<String>) -> Self {
        ParseError::LengthViolation {
            layer,
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(layer: &'static str, detail: impl Into<String>) -> Self {
        ParseError::UnsupportedEncapsulation {
            layer,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::Truncated { .. } => ParseErrorKind::Truncated,
            ParseError::LengthViolation { .. } => ParseErrorKind::LengthViolation,
            ParseError::UnsupportedEncapsulation { .. } => {
                ParseErrorKind::UnsupportedEncapsulation
            }
        }
    }

    /// Protocol layer that rejected the input (e.g. `"tcp"`, `"sctp chunk"`).
    pub fn layer(&self) -> &'static str {
        match self {
            ParseError::Truncated { layer, .. }
            | ParseError::LengthViolation { layer, .. }
            | ParseError::UnsupportedEncapsulation { layer, .. } => layer,
        }
    }

    /// Absolute buffer offset of the violation, when one applies.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Truncated { offset, .. } | ParseError::LengthViolation { offset, .. } => {
                Some(*offset)
            }
            ParseError::UnsupportedEncapsulation { .. } => None,
        }
    }
}
