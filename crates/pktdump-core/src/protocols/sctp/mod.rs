//! SCTP decoding (RFC 9260 plus the I-DATA, NR-SACK, PR-SCTP and padding
//! extensions).
//!
//! A packet is a 12-byte common header followed by a sequence of padded
//! chunks. Some chunks carry their own padded record lists: INIT, INIT_ACK
//! and HEARTBEAT carry parameters, ABORT and ERROR carry error causes. Those
//! two record families use separate type-code spaces, so they decode into
//! separate types ([`SctpParameter`] and [`SctpCause`]).
//!
//! Unknown chunk, parameter and cause types are never an error: they are kept
//! verbatim in an `Unrecognized` variant. Structural problems (a length field
//! that does not fit, a fixed-size record with the wrong size) abort the
//! whole parse.
//!
//! Version française (résumé):
//! En-tête commun, puis une suite de chunks alignés sur 4 octets. Les
//! paramètres et les causes d'erreur utilisent des espaces de types
//! distincts. Les types inconnus sont conservés tels quels.
pub mod chunk;
pub mod layout;
pub mod parameter;
pub mod parser;

pub use chunk::{DataChunk, ForwardTsnStream, IDataChunk, IForwardTsnStream, InitChunk, SackChunk, SctpChunk};
pub use parameter::{SctpCause, SctpParameter};
pub use parser::{SctpCommonHeader, parse_chunks, parse_common_header};
