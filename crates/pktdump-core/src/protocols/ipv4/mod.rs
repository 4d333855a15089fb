//! IPv4 header decoding.
//!
//! The header length (IHL) and total length are validated against the bytes
//! actually present; options are skipped. Anything past the total length is
//! link-layer trailer and is not part of the datagram.
pub mod layout;
pub mod parser;

pub use parser::{Ipv4Header, parse_ipv4};
