//! GRE (RFC 2784 / RFC 2890) header decoding.
//!
//! The optional checksum, key and sequence words are decoded when their flag
//! bits are set. Only version 0 is accepted; the protocol type selects IPv4,
//! IPv6 or an MPLS label stack as the next layer.
pub mod layout;
pub mod parser;

pub use parser::{GreHeader, parse_gre};
