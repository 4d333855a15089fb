//! TCP segment decoding.
//!
//! The fixed header is decoded into a [`TcpSegment`]; the options region is
//! walked into an ordered [`TcpOption`] list. Option kinds without a decoder
//! are kept as [`TcpOption::Unknown`] so that experimental options never fail
//! a parse, while known kinds with a wrong length do.
//!
//! Version française (résumé):
//! Décodage de l'en-tête TCP et de ses options. Les options inconnues sont
//! conservées, les longueurs incohérentes sont rejetées.
pub mod layout;
pub mod parser;

pub use parser::{TcpFlags, TcpOption, TcpSegment, parse_tcp};
