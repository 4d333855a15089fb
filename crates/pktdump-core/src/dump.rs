//! Capture-file driver: decode and render every frame of a capture.
//!
//! Per-packet parse or render failures are recorded in the output and never
//! abort the run; only source errors (I/O, broken capture framing) do.
//!
//! Version française (résumé):
//! Décode et affiche chaque trame d'une capture. Les erreurs par paquet sont
//! consignées dans le résultat; seules les erreurs de source sont fatales.

use std::path::Path;

use pcap_parser::Linktype;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::format::Verbosity;
use crate::packet::{FrameHint, LeafProtocol, Packet};
use crate::protocols::error::{ParseError, ParseErrorKind};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// How each frame of a capture is decoded and rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpOptions {
    /// Protocol to decode inside UDP payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_leaf: Option<LeafProtocol>,
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Tool metadata embedded in dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl Default for ToolInfo {
    fn default() -> Self {
        ToolInfo {
            name: "pktdump".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Input capture metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputInfo {
    /// Path as provided by the caller.
    pub path: String,
    /// Size in bytes, when the input is a regular file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

/// Why a frame could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketFailure {
    /// `truncated`, `length_violation`, `unsupported_encapsulation` or
    /// `internal_format_failure`.
    pub kind: String,
    pub layer: Option<String>,
    pub offset: Option<usize>,
    pub message: String,
}

impl From<&ParseError> for PacketFailure {
    fn from(err: &ParseError) -> Self {
        let kind = match err.kind() {
            ParseErrorKind::Truncated => "truncated",
            ParseErrorKind::LengthViolation => "length_violation",
            ParseErrorKind::UnsupportedEncapsulation => "unsupported_encapsulation",
        };
        PacketFailure {
            kind: kind.to_string(),
            layer: Some(err.layer().to_string()),
            offset: err.offset(),
            message: err.to_string(),
        }
    }
}

/// One frame of the capture, decoded or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Zero-based position in the capture.
    pub index: u64,
    /// RFC 3339 capture time, when the block carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Captured bytes.
    pub length: usize,
    /// Length on the wire.
    pub original_length: u32,
    pub linktype: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PacketFailure>,
}

impl PacketRecord {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Counts over the whole capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpSummary {
    pub packets_total: u64,
    pub packets_decoded: u64,
    pub packets_failed: u64,
}

/// Rendering of a whole capture, in capture order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDump {
    pub tool: ToolInfo,
    pub input: InputInfo,
    pub options: DumpOptions,
    pub summary: DumpSummary,
    pub packets: Vec<PacketRecord>,
}

/// Outer framing implied by a capture link type.
///
/// # Examples
/// ```
/// use pcap_parser::Linktype;
/// use pktdump_core::{FrameHint, frame_hint_for_linktype};
///
/// assert_eq!(frame_hint_for_linktype(Linktype::RAW), Some(FrameHint::RawIp));
/// assert_eq!(frame_hint_for_linktype(Linktype::NULL), None);
/// ```
pub fn frame_hint_for_linktype(linktype: Linktype) -> Option<FrameHint> {
    match linktype {
        Linktype::ETHERNET => Some(FrameHint::Ethernet),
        Linktype::RAW => Some(FrameHint::RawIp),
        Linktype::IPV4 => Some(FrameHint::Ipv4),
        Linktype::IPV6 => Some(FrameHint::Ipv6),
        _ => None,
    }
}

/// Decode every frame of a capture file.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use pktdump_core::{DumpOptions, dump_capture_file};
///
/// let dump = dump_capture_file(Path::new("capture.pcapng"), &DumpOptions::default())?;
/// for record in &dump.packets {
///     println!("{}", record.summary.as_deref().unwrap_or("<error>"));
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn dump_capture_file(path: &Path, options: &DumpOptions) -> Result<CaptureDump, DumpError> {
    let bytes = path.metadata()?.len();
    let source = PcapFileSource::open(path)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: Some(bytes),
    };
    dump_source(input, source, options)
}

/// Decode every frame yielded by `source`.
pub fn dump_source<S: PacketSource>(
    input: InputInfo,
    mut source: S,
    options: &DumpOptions,
) -> Result<CaptureDump, DumpError> {
    let mut summary = DumpSummary::default();
    let mut packets = Vec::new();

    while let Some(event) = source.next_packet()? {
        let record = dump_packet(summary.packets_total, event, options);
        summary.packets_total += 1;
        if record.is_ok() {
            summary.packets_decoded += 1;
        } else {
            summary.packets_failed += 1;
        }
        packets.push(record);
    }

    info!(
        input = %input.path,
        total = summary.packets_total,
        failed = summary.packets_failed,
        "capture dumped"
    );
    Ok(CaptureDump {
        tool: ToolInfo::default(),
        input,
        options: *options,
        summary,
        packets,
    })
}

/// Decode and render a single captured frame.
pub fn dump_packet(index: u64, event: PacketEvent, options: &DumpOptions) -> PacketRecord {
    let PacketEvent {
        ts,
        linktype,
        data,
        original_len,
    } = event;
    let mut record = PacketRecord {
        index,
        timestamp: ts_to_rfc3339(ts),
        length: data.len(),
        original_length: original_len,
        linktype: linktype.0,
        summary: None,
        error: None,
    };

    let Some(frame) = frame_hint_for_linktype(linktype) else {
        debug!(index, linktype = linktype.0, "unsupported link type");
        record.error = Some(PacketFailure::from(&ParseError::unsupported(
            "link",
            format!("link type {}", linktype.0),
        )));
        return record;
    };

    match Packet::parse(data, frame, options.expected_leaf) {
        Ok(packet) => match packet.format(options.verbosity) {
            Ok(text) => record.summary = Some(text),
            Err(err) => {
                record.error = Some(PacketFailure {
                    kind: "internal_format_failure".to_string(),
                    layer: None,
                    offset: None,
                    message: err.to_string(),
                });
            }
        },
        Err(err) => record.error = Some(PacketFailure::from(&err)),
    }
    record
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0).round() as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
