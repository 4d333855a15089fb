use crate::protocols::ethernet::EthernetFrame;
use crate::protocols::gre::GreHeader;
use crate::protocols::ipv4::Ipv4Header;
use crate::protocols::ipv6::Ipv6Header;
use crate::protocols::mpls::MplsEntry;
use crate::protocols::sctp::{SctpChunk, SctpCommonHeader};
use crate::protocols::tcp::TcpSegment;
use crate::protocols::udp::{UdpDatagram, UdpLiteDatagram};

/// One decoded protocol layer, outermost first in [`Packet::layers`](crate::Packet::layers).
///
/// Each SCTP chunk is its own layer following the [`Layer::Sctp`] common
/// header; each MPLS label stack entry is likewise its own layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Ethernet(EthernetFrame),
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    Gre(GreHeader),
    Mpls(MplsEntry),
    Tcp(TcpSegment),
    Udp(UdpDatagram),
    UdpLite(UdpLiteDatagram),
    Sctp(SctpCommonHeader),
    SctpChunk(SctpChunk),
}

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Ethernet(_) => "ethernet",
            Layer::Ipv4(_) => "ipv4",
            Layer::Ipv6(_) => "ipv6",
            Layer::Gre(_) => "gre",
            Layer::Mpls(_) => "mpls",
            Layer::Tcp(_) => "tcp",
            Layer::Udp(_) => "udp",
            Layer::UdpLite(_) => "udplite",
            Layer::Sctp(_) => "sctp",
            Layer::SctpChunk(_) => "sctp chunk",
        }
    }

    pub fn is_ip(&self) -> bool {
        matches!(self, Layer::Ipv4(_) | Layer::Ipv6(_))
    }
}
