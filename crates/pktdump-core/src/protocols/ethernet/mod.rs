//! Ethernet II framing.
//!
//! Only the 14-byte header is decoded; the ethertype selects the next layer.
//! VLAN tags are not unwrapped.
pub mod layout;
pub mod parser;

pub use parser::{EthernetFrame, parse_ethernet};
