//! One-line textual rendering of a decoded [`Packet`].
//!
//! The line reads outside-in:
//!
//! 1. one prefix per encapsulation layer in front of the innermost IP header
//!    (`ipv4 S > D: `, `ipv6 S > D: `, `gre: `, `mpls (...): `),
//! 2. at [`Verbosity::Standard`] and above, the endpoints of the leaf
//!    transport (`S:sport > D:dport `),
//! 3. the transport summary (TCP segment, SCTP chunk list, UDP or UDP-Lite
//!    length), with `/udp(sp > dp)` when the leaf rides inside UDP,
//! 4. at [`Verbosity::Verbose`], a newline and a hex dump of the whole buffer.
//!
//! Version française (résumé):
//! Préfixes d'encapsulation, puis extrémités (ports), puis résumé de la couche
//! transport; en mode verbeux, vidage hexadécimal du paquet complet.

mod hex;
mod sctp;
mod tcp;

use std::fmt::{self, Display, Write};
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layer::Layer;
use crate::packet::Packet;
use crate::protocols::mpls::MplsEntry;
use crate::protocols::sctp::{SctpChunk, SctpCommonHeader};
use crate::protocols::tcp::TcpSegment;
use crate::protocols::udp::{UdpDatagram, UdpLiteDatagram};

pub use hex::{BYTES_PER_LINE, hex_dump, write_hex_dump};

/// Amount of detail in a rendered line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Encapsulation and transport summary only.
    Brief,
    /// Adds the transport endpoints.
    #[default]
    Standard,
    /// Adds a hex dump of the whole buffer on the following lines.
    Verbose,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The layer stack has a shape the renderer does not know how to print.
    #[error("internal format failure: {reason}")]
    InternalFormatFailure { reason: String },
}

impl FormatError {
    fn internal(reason: impl Into<String>) -> Self {
        FormatError::InternalFormatFailure {
            reason: reason.into(),
        }
    }
}

impl From<fmt::Error> for FormatError {
    fn from(_: fmt::Error) -> Self {
        FormatError::internal("formatter error")
    }
}

/// Items printed with a separator between them.
pub(crate) struct Joined<'a, T>(pub(crate) &'a [T], pub(crate) &'static str);

impl<T: Display> Display for Joined<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(self.1)?;
            }
            item.fmt(f)?;
        }
        Ok(())
    }
}

/// Render `packet` as text.
///
/// # Examples
/// ```
/// use pktdump_core::{FrameHint, Packet, Verbosity, format};
///
/// let bytes = vec![
///     0x45, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x00, 0xff, 0x84, 0xb5, 0x50,
///     0x02, 0x02, 0x02, 0x02, 0x01, 0x01, 0x01, 0x01, 0x04, 0xd2, 0x1f, 0x90,
///     0x01, 0x02, 0x03, 0x04, 0x3d, 0x99, 0xbf, 0xe3, 0x06, 0x01, 0x00, 0x04,
/// ];
/// let packet = Packet::parse(bytes, FrameHint::Ipv4, None)?;
/// assert_eq!(
///     format(&packet, Verbosity::Standard)?,
///     "2.2.2.2:1234 > 1.1.1.1:8080 sctp: ABORT[flgs=T]"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn format(packet: &Packet, verbosity: Verbosity) -> Result<String, FormatError> {
    let view = StackView::split(packet.layers())?;
    let mut out = String::new();

    write_encapsulation(&mut out, view.encapsulation)?;
    if verbosity != Verbosity::Brief {
        let (source_port, destination_port) = view.transport.ports();
        write!(
            out,
            "{}:{} > {}:{} ",
            view.addresses.0, source_port, view.addresses.1, destination_port
        )?;
    }
    view.transport.write(&mut out)?;

    if verbosity == Verbosity::Verbose {
        out.push('\n');
        write_hex_dump(&mut out, packet.bytes())?;
    }
    Ok(out)
}

/// UDP or UDP-Lite carrying the leaf transport.
#[derive(Debug, Clone, Copy)]
struct Tunnel {
    name: &'static str,
    source_port: u16,
    destination_port: u16,
}

impl Tunnel {
    fn from_layer(layer: &Layer) -> Option<Self> {
        match layer {
            Layer::Udp(udp) => Some(Tunnel {
                name: "udp",
                source_port: udp.source_port,
                destination_port: udp.destination_port,
            }),
            Layer::UdpLite(udplite) => Some(Tunnel {
                name: "udplite",
                source_port: udplite.source_port,
                destination_port: udplite.destination_port,
            }),
            _ => None,
        }
    }
}

impl Display for Tunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}({} > {})",
            self.name, self.source_port, self.destination_port
        )
    }
}

/// Leaf transport as it gets printed.
enum Transport<'a> {
    Tcp {
        segment: &'a TcpSegment,
        tunnel: Option<Tunnel>,
    },
    Sctp {
        header: &'a SctpCommonHeader,
        chunks: Vec<&'a SctpChunk>,
        tunnel: Option<Tunnel>,
    },
    Udp(&'a UdpDatagram),
    UdpLite(&'a UdpLiteDatagram),
}

impl<'a> Transport<'a> {
    fn from_layers(layers: &'a [Layer]) -> Result<Self, FormatError> {
        let (tunnel, rest) = match layers.split_first() {
            Some((first, rest)) if !rest.is_empty() => match Tunnel::from_layer(first) {
                Some(tunnel) => (Some(tunnel), rest),
                None => (None, layers),
            },
            _ => (None, layers),
        };

        match rest {
            [Layer::Tcp(segment)] => Ok(Transport::Tcp { segment, tunnel }),
            [Layer::Sctp(header), chunks @ ..] => {
                let chunks = chunks
                    .iter()
                    .map(|layer| match layer {
                        Layer::SctpChunk(chunk) => Ok(chunk),
                        other => Err(FormatError::internal(format!(
                            "{} layer inside sctp chunk list",
                            other.name()
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Transport::Sctp {
                    header,
                    chunks,
                    tunnel,
                })
            }
            [Layer::Udp(udp)] if tunnel.is_none() => Ok(Transport::Udp(udp)),
            [Layer::UdpLite(udplite)] if tunnel.is_none() => Ok(Transport::UdpLite(udplite)),
            [] => Err(FormatError::internal("no transport layer after ip")),
            [first, ..] => Err(FormatError::internal(format!(
                "unexpected {} layer after ip",
                first.name()
            ))),
        }
    }

    fn ports(&self) -> (u16, u16) {
        match self {
            Transport::Tcp { segment, .. } => (segment.source_port, segment.destination_port),
            Transport::Sctp { header, .. } => (header.source_port, header.destination_port),
            Transport::Udp(udp) => (udp.source_port, udp.destination_port),
            Transport::UdpLite(udplite) => (udplite.source_port, udplite.destination_port),
        }
    }

    fn write<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Transport::Tcp { segment, tunnel } => {
                tcp::write_segment(out, segment)?;
                if let Some(tunnel) = tunnel {
                    write!(out, "{tunnel}")?;
                }
                Ok(())
            }
            Transport::Sctp { chunks, tunnel, .. } => {
                out.write_str("sctp")?;
                if let Some(tunnel) = tunnel {
                    write!(out, "{tunnel}")?;
                }
                write!(out, ": {}", Joined(chunks, "; "))
            }
            Transport::Udp(udp) => write!(out, "udp ({})", udp.payload_len()),
            Transport::UdpLite(udplite) => write!(
                out,
                "udplite ({}, {})",
                udplite.payload_len, udplite.checksum_coverage
            ),
        }
    }
}

/// Layers split around the innermost IP header.
struct StackView<'a> {
    encapsulation: &'a [Layer],
    addresses: (IpAddr, IpAddr),
    transport: Transport<'a>,
}

impl<'a> StackView<'a> {
    fn split(layers: &'a [Layer]) -> Result<Self, FormatError> {
        let ip_index = layers
            .iter()
            .rposition(Layer::is_ip)
            .ok_or_else(|| FormatError::internal("no ip layer"))?;
        let addresses = match &layers[ip_index] {
            Layer::Ipv4(ip) => (IpAddr::V4(ip.source), IpAddr::V4(ip.destination)),
            Layer::Ipv6(ip) => (IpAddr::V6(ip.source), IpAddr::V6(ip.destination)),
            other => {
                return Err(FormatError::internal(format!(
                    "{} is not an ip layer",
                    other.name()
                )));
            }
        };
        Ok(StackView {
            encapsulation: &layers[..ip_index],
            addresses,
            transport: Transport::from_layers(&layers[ip_index + 1..])?,
        })
    }
}

fn write_encapsulation<W: Write>(out: &mut W, layers: &[Layer]) -> Result<(), FormatError> {
    let mut index = 0;
    while let Some(layer) = layers.get(index) {
        match layer {
            Layer::Ethernet(_) => {}
            Layer::Ipv4(ip) => write!(out, "ipv4 {} > {}: ", ip.source, ip.destination)?,
            Layer::Ipv6(ip) => write!(out, "ipv6 {} > {}: ", ip.source, ip.destination)?,
            Layer::Gre(_) => out.write_str("gre: ")?,
            Layer::Mpls(_) => {
                let entries: Vec<&MplsEntry> = layers[index..]
                    .iter()
                    .map_while(|layer| match layer {
                        Layer::Mpls(entry) => Some(entry),
                        _ => None,
                    })
                    .collect();
                out.write_str("mpls")?;
                for entry in &entries {
                    write!(out, " {}", MplsLabel(entry))?;
                }
                out.write_str(": ")?;
                index += entries.len();
                continue;
            }
            other => {
                return Err(FormatError::internal(format!(
                    "{} layer cannot encapsulate ip",
                    other.name()
                )));
            }
        }
        index += 1;
    }
    Ok(())
}

/// `(label L, tc T, [S], ttl N)`
struct MplsLabel<'a>(&'a MplsEntry);

impl Display for MplsLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.0;
        write!(f, "(label {}, tc {}, ", entry.label, entry.tc)?;
        if entry.bottom_of_stack {
            f.write_str("[S], ")?;
        }
        write!(f, "ttl {})", entry.ttl)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{FormatError, Joined, StackView, Verbosity, format};
    use crate::layer::Layer;
    use crate::packet::{FrameHint, Packet};
    use crate::protocols::ipv4::Ipv4Header;
    use crate::protocols::udp::UdpDatagram;

    fn ipv4() -> Layer {
        Layer::Ipv4(Ipv4Header {
            header_len: 20,
            total_len: 28,
            ttl: 64,
            protocol: 17,
            source: Ipv4Addr::new(10, 0, 0, 1),
            destination: Ipv4Addr::new(10, 0, 0, 2),
        })
    }

    fn udp() -> Layer {
        Layer::Udp(UdpDatagram {
            source_port: 53,
            destination_port: 5353,
            length: 8,
            checksum: 0,
        })
    }

    #[test]
    fn joined_separates_items() {
        assert_eq!(Joined(&[1, 2, 3], ", ").to_string(), "1, 2, 3");
        assert_eq!(Joined::<u8>(&[], ", ").to_string(), "");
    }

    #[test]
    fn plain_udp_prints_payload_length() {
        let bytes = vec![
            0x45, 0x00, 0x00, 0x1e, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00, 0x0a, 0x00,
            0x00, 0x01, 0x0a, 0x00, 0x00, 0x02, 0x00, 0x35, 0x14, 0xe9, 0x00, 0x0a, 0x00, 0x00,
            0xaa, 0xbb,
        ];
        let packet = Packet::parse(bytes, FrameHint::Ipv4, None).unwrap();
        assert_eq!(format(&packet, Verbosity::Brief).unwrap(), "udp (2)");
        assert_eq!(
            format(&packet, Verbosity::Standard).unwrap(),
            "10.0.0.1:53 > 10.0.0.2:5353 udp (2)"
        );
    }

    #[test]
    fn verbose_appends_hex_dump() {
        let bytes = vec![
            0x45, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00, 0x0a, 0x00,
            0x00, 0x01, 0x0a, 0x00, 0x00, 0x02, 0x00, 0x35, 0x14, 0xe9, 0x00, 0x08, 0x00, 0x00,
        ];
        let packet = Packet::parse(bytes, FrameHint::Ipv4, None).unwrap();
        let text = format(&packet, Verbosity::Verbose).unwrap();
        let (line, dump) = text.split_once('\n').unwrap();
        assert_eq!(line, "10.0.0.1:53 > 10.0.0.2:5353 udp (0)");
        assert_eq!(
            dump,
            "0x0000: 45 00 00 1c 00 00 00 00 40 11 00 00 0a 00 00 01 \n\
             0x0010: 0a 00 00 02 00 35 14 e9 00 08 00 00 \n"
        );
    }

    #[test]
    fn stack_without_ip_is_internal_failure() {
        let err = StackView::split(&[udp()]).err().unwrap();
        assert!(matches!(err, FormatError::InternalFormatFailure { .. }));
    }

    #[test]
    fn stray_layer_after_transport_is_internal_failure() {
        let err = StackView::split(&[ipv4(), udp(), udp()]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "internal format failure: unexpected udp layer after ip"
        );
    }

    #[test]
    fn verbosity_defaults_to_standard() {
        assert_eq!(Verbosity::default(), Verbosity::Standard);
    }
}
