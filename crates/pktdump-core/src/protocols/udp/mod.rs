//! UDP and UDP-Lite header decoding.
//!
//! Both share the 8-byte header shape. For UDP the length field bounds the
//! datagram; for UDP-Lite the same field is the checksum coverage and the
//! datagram runs to the end of the enclosing IP payload (RFC 3828).
pub mod layout;
pub mod parser;

pub use parser::{UdpDatagram, UdpLiteDatagram, parse_udp, parse_udplite};
