//! IPv6 fixed header decoding. Extension headers are not walked; a next
//! header value without a decoder is reported as unsupported by the stack
//! builder.
pub mod layout;
pub mod parser;

pub use parser::{Ipv6Header, parse_ipv6};
