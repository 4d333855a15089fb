//! Packet sources for capture files.
//!
//! A source yields raw frames together with the link type that says how the
//! first bytes should be framed. All file I/O of the crate lives here; the
//! decoders never see anything but byte slices.

mod pcap;

pub use pcap::{PcapFileSource, PcapSource};

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketEvent {
    /// Capture time in seconds since the Unix epoch, when the block carries one.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
    /// Length on the wire; larger than `data.len()` when the capture was snapped.
    pub original_len: u32,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

impl<S: PacketSource + ?Sized> PacketSource for &mut S {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        (**self).next_packet()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture format error ({context}): {message}")]
    Pcap {
        context: &'static str,
        message: String,
    },
}

impl SourceError {
    pub(crate) fn pcap(context: &'static str, err: impl std::fmt::Display) -> Self {
        SourceError::Pcap {
            context,
            message: err.to_string(),
        }
    }
}
