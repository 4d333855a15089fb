//! pktdump core library: decode raw network packets and render them as text.
//!
//! The pipeline is byte-oriented and side-effect free. A bounds-checked
//! [`ByteCursor`](protocols::common::ByteCursor) feeds per-protocol decoders
//! (each split into `layout` constants and a `parser`), the stack builder
//! chains them from the outer framing down to the transport, and the
//! formatter renders the resulting [`Layer`] list as a single line, optionally
//! followed by a hex dump. File I/O is confined to the `source` side, used by
//! the capture-file driver ([`dump_capture_file`]).
//!
//! Invariants:
//! - No decoder reads past the bytes it was handed; every declared length is
//!   checked against what is actually available.
//! - A [`Packet`] exists only when the whole buffer parsed; failures yield a
//!   [`ParseError`] naming the protocol layer and absolute offset.
//! - Unknown SCTP chunk, parameter and cause types are preserved, not rejected.
//!
//! Version française (résumé):
//! Cette crate décode des paquets réseau bruts (IPv4/IPv6, GRE, MPLS, TCP, UDP,
//! UDP-Lite, SCTP) et les affiche sur une ligne, avec vidage hexadécimal en
//! option. Aucune lecture hors limites; les types SCTP inconnus sont conservés.
//!
//! # Examples
//! ```
//! use pktdump_core::{FrameHint, Packet, Verbosity};
//!
//! let bytes = vec![
//!     0x45, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x00, 0xff, 0x84, 0xb5, 0x50,
//!     0x02, 0x02, 0x02, 0x02, 0x01, 0x01, 0x01, 0x01, 0x04, 0xd2, 0x1f, 0x90,
//!     0x01, 0x02, 0x03, 0x04, 0x3d, 0x99, 0xbf, 0xe3, 0x06, 0x01, 0x00, 0x04,
//! ];
//! let packet = Packet::parse(bytes, FrameHint::Ipv4, None)?;
//! println!("{}", packet.format(Verbosity::Verbose)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dump;
mod format;
mod layer;
mod packet;
pub mod protocols;
mod source;
mod stack;

pub use dump::{
    CaptureDump, DumpError, DumpOptions, DumpSummary, InputInfo, PacketFailure, PacketRecord,
    ToolInfo, dump_capture_file, dump_packet, dump_source, frame_hint_for_linktype,
};
pub use format::{BYTES_PER_LINE, FormatError, Verbosity, format, hex_dump, write_hex_dump};
pub use layer::Layer;
pub use packet::{FrameHint, LeafProtocol, Packet, parse};
pub use protocols::error::{ParseError, ParseErrorKind};
pub use source::{PacketEvent, PacketSource, PcapFileSource, PcapSource, SourceError};
