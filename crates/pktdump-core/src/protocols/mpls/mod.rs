//! MPLS label stack entries (RFC 3032). The stack builder keeps reading
//! entries until one carries the bottom-of-stack bit.
pub mod layout;
pub mod parser;

pub use parser::{MplsEntry, parse_mpls_entry};
