use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::{FormatError, Verbosity};
use crate::layer::Layer;
use crate::protocols::common::numbers::{ETHERTYPE_IPV4, ETHERTYPE_IPV6};
use crate::protocols::error::ParseError;
use crate::stack::build_layers;

/// Outermost framing of a raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameHint {
    /// Ethernet II header in front of the network layer.
    Ethernet,
    Ipv4,
    Ipv6,
    /// Bare IP, version taken from the first nibble.
    RawIp,
}

impl FrameHint {
    /// Hint for a buffer whose network protocol is known by ethertype.
    ///
    /// # Examples
    /// ```
    /// use pktdump_core::FrameHint;
    ///
    /// assert_eq!(FrameHint::from_ethertype(0x86dd), Some(FrameHint::Ipv6));
    /// assert_eq!(FrameHint::from_ethertype(0x0806), None);
    /// ```
    pub fn from_ethertype(ethertype: u16) -> Option<Self> {
        match ethertype {
            ETHERTYPE_IPV4 => Some(FrameHint::Ipv4),
            ETHERTYPE_IPV6 => Some(FrameHint::Ipv6),
            _ => None,
        }
    }
}

/// Protocol expected inside a UDP or UDP-Lite payload (tunneling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafProtocol {
    Tcp,
    Sctp,
}

/// A raw buffer together with its decoded layer stack.
///
/// A `Packet` only exists once its bytes parsed successfully; a failed parse
/// yields the [`ParseError`] instead, so the two outcomes never coexist.
///
/// # Examples
/// ```
/// use pktdump_core::{FrameHint, Packet, Verbosity};
///
/// let bytes = vec![
///     0x45, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x00, 0xff, 0x84, 0xb5, 0x50,
///     0x02, 0x02, 0x02, 0x02, 0x01, 0x01, 0x01, 0x01, 0x04, 0xd2, 0x1f, 0x90,
///     0x01, 0x02, 0x03, 0x04, 0x3d, 0x99, 0xbf, 0xe3, 0x06, 0x01, 0x00, 0x04,
/// ];
/// let packet = Packet::parse(bytes, FrameHint::Ipv4, None)?;
/// assert_eq!(packet.format(Verbosity::Brief)?, "sctp: ABORT[flgs=T]");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8>,
    layers: Vec<Layer>,
}

impl Packet {
    pub fn parse(
        bytes: impl Into<Vec<u8>>,
        frame: FrameHint,
        expected_leaf: Option<LeafProtocol>,
    ) -> Result<Self, ParseError> {
        let bytes = bytes.into();
        match build_layers(&bytes, frame, expected_leaf) {
            Ok(layers) => Ok(Packet { bytes, layers }),
            Err(err) => {
                debug!(error = %err, len = bytes.len(), ?frame, "packet parse failed");
                Err(err)
            }
        }
    }

    /// The original buffer, untouched.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decoded layers, outermost first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn format(&self, verbosity: Verbosity) -> Result<String, FormatError> {
        crate::format::format(self, verbosity)
    }
}

/// Free-function form of [`Packet::parse`].
pub fn parse(
    bytes: impl Into<Vec<u8>>,
    frame: FrameHint,
    expected_leaf: Option<LeafProtocol>,
) -> Result<Packet, ParseError> {
    Packet::parse(bytes, frame, expected_leaf)
}

#[cfg(test)]
mod tests {
    use super::{FrameHint, LeafProtocol, Packet};
    use crate::layer::Layer;

    #[test]
    fn parse_keeps_buffer_and_layers() {
        let bytes = vec![
            0x45, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00, 0x0a, 0x00,
            0x00, 0x01, 0x0a, 0x00, 0x00, 0x02, 0x00, 0x35, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00,
        ];
        let err = Packet::parse(bytes.clone(), FrameHint::Ipv4, Some(LeafProtocol::Tcp))
            .unwrap_err();
        assert_eq!(err.layer(), "tcp");

        let packet = Packet::parse(bytes.clone(), FrameHint::Ipv4, None).unwrap();
        assert_eq!(packet.bytes(), bytes.as_slice());
        assert!(matches!(packet.layers(), [Layer::Ipv4(_), Layer::Udp(_)]));
    }

    #[test]
    fn hints_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&FrameHint::RawIp).unwrap(),
            "\"rawip\""
        );
        assert_eq!(
            serde_json::to_string(&LeafProtocol::Sctp).unwrap(),
            "\"sctp\""
        );
    }
}
