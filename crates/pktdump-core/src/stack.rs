//! Layer stack builder.
//!
//! Drives the protocol decoders from the outer frame hint inwards. Each stage
//! decodes one header from its byte region and names the stage and region
//! that follow; the loop ends when a stage reports no further encapsulation.
//! The first error ends the whole build and the partial stack is dropped.

use tracing::trace;

use crate::layer::Layer;
use crate::packet::{FrameHint, LeafProtocol};
use crate::protocols::common::ByteCursor;
use crate::protocols::common::numbers::{
    ETHERTYPE_IPV4, ETHERTYPE_IPV6, ETHERTYPE_MPLS_MULTICAST, ETHERTYPE_MPLS_UNICAST,
    IPPROTO_GRE, IPPROTO_IPIP, IPPROTO_IPV6, IPPROTO_SCTP, IPPROTO_TCP, IPPROTO_UDP,
    IPPROTO_UDPLITE,
};
use crate::protocols::error::ParseError;
use crate::protocols::{ethernet, gre, ipv4, ipv6, mpls, sctp, tcp, udp};

/// Layer name used when an IP header is selected by its version nibble.
const IP_LAYER: &str = "ip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ethernet,
    /// IPv4 or IPv6, chosen by the version nibble.
    AnyIp,
    Ipv4,
    Ipv6,
    Gre,
    Mpls,
    Tcp,
    Udp,
    UdpLite,
    Sctp,
}

impl Stage {
    fn layer_name(self) -> &'static str {
        match self {
            Stage::Ethernet => ethernet::layout::LAYER,
            Stage::AnyIp => IP_LAYER,
            Stage::Ipv4 => ipv4::layout::LAYER,
            Stage::Ipv6 => ipv6::layout::LAYER,
            Stage::Gre => gre::layout::LAYER,
            Stage::Mpls => mpls::layout::LAYER,
            Stage::Tcp => tcp::layout::LAYER,
            Stage::Udp => udp::layout::LAYER,
            Stage::UdpLite => udp::layout::LITE_LAYER,
            Stage::Sctp => sctp::layout::LAYER,
        }
    }
}

impl From<FrameHint> for Stage {
    fn from(frame: FrameHint) -> Self {
        match frame {
            FrameHint::Ethernet => Stage::Ethernet,
            FrameHint::Ipv4 => Stage::Ipv4,
            FrameHint::Ipv6 => Stage::Ipv6,
            FrameHint::RawIp => Stage::AnyIp,
        }
    }
}

impl From<LeafProtocol> for Stage {
    fn from(leaf: LeafProtocol) -> Self {
        match leaf {
            LeafProtocol::Tcp => Stage::Tcp,
            LeafProtocol::Sctp => Stage::Sctp,
        }
    }
}

/// Byte range a stage decodes, with its absolute offset in the packet.
#[derive(Debug, Clone, Copy)]
struct Region<'a> {
    bytes: &'a [u8],
    base: usize,
}

type Next<'a> = Option<(Stage, Region<'a>)>;

pub(crate) fn build_layers(
    bytes: &[u8],
    frame: FrameHint,
    expected_leaf: Option<LeafProtocol>,
) -> Result<Vec<Layer>, ParseError> {
    let mut layers = Vec::new();
    let mut next = Some((Stage::from(frame), Region { bytes, base: 0 }));
    while let Some((stage, region)) = next {
        next = decode_stage(stage, region, expected_leaf, &mut layers)?;
    }
    Ok(layers)
}

fn decode_stage<'a>(
    stage: Stage,
    region: Region<'a>,
    expected_leaf: Option<LeafProtocol>,
    layers: &mut Vec<Layer>,
) -> Result<Next<'a>, ParseError> {
    let mut cursor = ByteCursor::at(region.bytes, region.base, stage.layer_name());
    match stage {
        Stage::Ethernet => {
            let frame = ethernet::parse_ethernet(&mut cursor)?;
            let next = stage_for_ethertype(frame.ethertype, ethernet::layout::LAYER)?;
            push(layers, Layer::Ethernet(frame), region.base);
            Ok(Some((next, rest(&mut cursor))))
        }
        Stage::AnyIp => Ok(Some((stage_for_ip_version(&cursor)?, region))),
        Stage::Ipv4 => {
            let header = ipv4::parse_ipv4(&mut cursor)?;
            let next = stage_for_ip_protocol(header.protocol, ipv4::layout::LAYER)?;
            let payload = sub_region(&mut cursor, header.payload_len())?;
            push(layers, Layer::Ipv4(header), region.base);
            Ok(Some((next, payload)))
        }
        Stage::Ipv6 => {
            let header = ipv6::parse_ipv6(&mut cursor)?;
            let next = stage_for_ip_protocol(header.next_header, ipv6::layout::LAYER)?;
            let payload = sub_region(&mut cursor, header.payload_len)?;
            push(layers, Layer::Ipv6(header), region.base);
            Ok(Some((next, payload)))
        }
        Stage::Gre => {
            let header = gre::parse_gre(&mut cursor)?;
            let next = stage_for_ethertype(header.protocol, gre::layout::LAYER)?;
            push(layers, Layer::Gre(header), region.base);
            Ok(Some((next, rest(&mut cursor))))
        }
        Stage::Mpls => {
            loop {
                let offset = cursor.offset();
                let entry = mpls::parse_mpls_entry(&mut cursor)?;
                push(layers, Layer::Mpls(entry), offset);
                if entry.bottom_of_stack {
                    break;
                }
            }
            Ok(Some((stage_for_ip_version(&cursor)?, rest(&mut cursor))))
        }
        Stage::Tcp => {
            let segment = tcp::parse_tcp(&mut cursor)?;
            push(layers, Layer::Tcp(segment), region.base);
            Ok(None)
        }
        Stage::Udp => {
            let datagram = udp::parse_udp(&mut cursor)?;
            let payload = sub_region(&mut cursor, datagram.payload_len())?;
            push(layers, Layer::Udp(datagram), region.base);
            Ok(expected_leaf.map(|leaf| (Stage::from(leaf), payload)))
        }
        Stage::UdpLite => {
            let datagram = udp::parse_udplite(&mut cursor)?;
            let payload = rest(&mut cursor);
            push(layers, Layer::UdpLite(datagram), region.base);
            Ok(expected_leaf.map(|leaf| (Stage::from(leaf), payload)))
        }
        Stage::Sctp => {
            let header = sctp::parse_common_header(&mut cursor)?;
            let chunks_base = cursor.offset();
            let chunks = sctp::parse_chunks(&mut cursor)?;
            push(layers, Layer::Sctp(header), region.base);
            for chunk in chunks {
                push(layers, Layer::SctpChunk(chunk), chunks_base);
            }
            Ok(None)
        }
    }
}

fn push(layers: &mut Vec<Layer>, layer: Layer, offset: usize) {
    trace!(layer = layer.name(), offset, depth = layers.len(), "decoded layer");
    layers.push(layer);
}

fn sub_region<'a>(cursor: &mut ByteCursor<'a>, len: usize) -> Result<Region<'a>, ParseError> {
    let base = cursor.offset();
    Ok(Region {
        bytes: cursor.take(len)?,
        base,
    })
}

fn rest<'a>(cursor: &mut ByteCursor<'a>) -> Region<'a> {
    let base = cursor.offset();
    Region {
        bytes: cursor.take_rest(),
        base,
    }
}

fn stage_for_ethertype(ethertype: u16, layer: &'static str) -> Result<Stage, ParseError> {
    match ethertype {
        ETHERTYPE_IPV4 => Ok(Stage::Ipv4),
        ETHERTYPE_IPV6 => Ok(Stage::Ipv6),
        ETHERTYPE_MPLS_UNICAST | ETHERTYPE_MPLS_MULTICAST => Ok(Stage::Mpls),
        other => Err(ParseError::unsupported(
            layer,
            format!("ethertype 0x{other:04x}"),
        )),
    }
}

fn stage_for_ip_protocol(protocol: u8, layer: &'static str) -> Result<Stage, ParseError> {
    match protocol {
        IPPROTO_TCP => Ok(Stage::Tcp),
        IPPROTO_UDP => Ok(Stage::Udp),
        IPPROTO_UDPLITE => Ok(Stage::UdpLite),
        IPPROTO_SCTP => Ok(Stage::Sctp),
        IPPROTO_GRE => Ok(Stage::Gre),
        IPPROTO_IPIP => Ok(Stage::Ipv4),
        IPPROTO_IPV6 => Ok(Stage::Ipv6),
        other => Err(ParseError::unsupported(layer, format!("IP protocol {other}"))),
    }
}

fn stage_for_ip_version(cursor: &ByteCursor<'_>) -> Result<Stage, ParseError> {
    match cursor.peek_u8()? >> 4 {
        ipv4::layout::VERSION => Ok(Stage::Ipv4),
        ipv6::layout::VERSION => Ok(Stage::Ipv6),
        other => Err(ParseError::unsupported(
            cursor.layer(),
            format!("IP version {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::build_layers;
    use crate::layer::Layer;
    use crate::packet::{FrameHint, LeafProtocol};
    use crate::protocols::error::ParseErrorKind;

    const UDP_SCTP: [u8; 44] = [
        0x45, 0x00, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0xff, 0x11, 0xb5, 0xbb, 0x02, 0x02,
        0x02, 0x02, 0x01, 0x01, 0x01, 0x01, 0x26, 0xab, 0x26, 0xab, 0x00, 0x18, 0x00, 0x00,
        0x04, 0xd2, 0x1f, 0x90, 0x01, 0x02, 0x03, 0x04, 0x3d, 0x99, 0xbf, 0xe3, 0x06, 0x01,
        0x00, 0x04,
    ];

    fn names(layers: &[Layer]) -> Vec<&'static str> {
        layers.iter().map(Layer::name).collect()
    }

    #[test]
    fn udp_payload_follows_leaf_hint() {
        let layers = build_layers(&UDP_SCTP, FrameHint::Ipv4, Some(LeafProtocol::Sctp)).unwrap();
        assert_eq!(names(&layers), ["ipv4", "udp", "sctp", "sctp chunk"]);
    }

    #[test]
    fn udp_payload_is_opaque_without_hint() {
        let layers = build_layers(&UDP_SCTP, FrameHint::Ipv4, None).unwrap();
        assert_eq!(names(&layers), ["ipv4", "udp"]);
    }

    #[test]
    fn raw_ip_selects_by_version_nibble() {
        let layers = build_layers(&UDP_SCTP, FrameHint::RawIp, None).unwrap();
        assert_eq!(names(&layers), ["ipv4", "udp"]);

        let err = build_layers(&[0x50, 0x00], FrameHint::RawIp, None).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnsupportedEncapsulation);
        assert_eq!(err.layer(), "ip");
    }

    #[test]
    fn ethernet_frame_dispatches_on_ethertype() {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&[0x08, 0x00]);
        frame.extend_from_slice(&UDP_SCTP);
        let layers = build_layers(&frame, FrameHint::Ethernet, None).unwrap();
        assert_eq!(names(&layers), ["ethernet", "ipv4", "udp"]);

        frame[12] = 0x08;
        frame[13] = 0x06;
        let err = build_layers(&frame, FrameHint::Ethernet, None).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnsupportedEncapsulation);
        assert_eq!(err.layer(), "ethernet");
    }

    #[test]
    fn unknown_ip_protocol_is_unsupported() {
        let mut bytes = UDP_SCTP;
        bytes[9] = 0x01;
        let err = build_layers(&bytes, FrameHint::Ipv4, None).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnsupportedEncapsulation);
        assert_eq!(err.layer(), "ipv4");
    }

    #[test]
    fn mpls_stack_without_bottom_is_truncated() {
        let bytes = [
            0x45, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x00, 0xff, 0x2f, 0x00, 0x00, 0x02, 0x02,
            0x02, 0x02, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x88, 0x47, 0x00, 0x00, 0x10, 0x40,
        ];
        let err = build_layers(&bytes, FrameHint::Ipv4, None).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Truncated);
        assert_eq!(err.layer(), "mpls");
    }
}
