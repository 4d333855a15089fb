//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, sizes and type codes (source of truth)
//! - `parser`: domain-level decoding through [`common::ByteCursor`], never by
//!   direct indexing
//!
//! Shared building blocks live in `common`: the bounds-checked cursor, the
//! padded TLV iterator used by SCTP, and assigned numbers. Every decoder
//! reports failures as a single [`error::ParseError`].
//!
//! Parsers are pure and contain no I/O; the stack builder chains them and the
//! capture driver handles file access.

pub mod common;
pub mod error;
pub mod ethernet;
pub mod gre;
pub mod ipv4;
pub mod ipv6;
pub mod mpls;
pub mod sctp;
pub mod tcp;
pub mod udp;
