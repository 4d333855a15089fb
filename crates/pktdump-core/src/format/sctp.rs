//! SCTP chunk, parameter and cause renderings.
//!
//! Every record renders as `NAME[field=value, ...]`; nested records reuse the
//! same bracket convention. Opaque blobs of known kinds print as `val=...`,
//! unknown records print their raw bytes.

use std::fmt::{self, Display, Write};

use super::Joined;
use crate::protocols::sctp::layout;
use crate::protocols::sctp::{
    DataChunk, ForwardTsnStream, IDataChunk, IForwardTsnStream, InitChunk, SackChunk,
    SctpCause, SctpChunk, SctpParameter,
};

const DATA_FLAG_LETTERS: [(u8, char); 4] = [
    (layout::FLAG_DATA_IMMEDIATE, 'I'),
    (layout::FLAG_DATA_UNORDERED, 'U'),
    (layout::FLAG_DATA_BEGINNING, 'B'),
    (layout::FLAG_DATA_END, 'E'),
];
const T_FLAG_LETTERS: [(u8, char); 1] = [(layout::FLAG_T_BIT, 'T')];

/// Chunk flags as letters when only known bits are set, otherwise as hex.
struct Flags<'a>(u8, &'a [(u8, char)]);

impl Display for Flags<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Flags(value, letters) = *self;
        let known = letters.iter().fold(0u8, |mask, (bit, _)| mask | bit);
        if value == 0 || value & !known != 0 {
            return write!(f, "0x{value:02x}");
        }
        for (bit, letter) in letters {
            if value & bit != 0 {
                f.write_char(*letter)?;
            }
        }
        Ok(())
    }
}

fn hex_flags(value: u8) -> Flags<'static> {
    Flags(value, &[])
}

/// `[0x01, 0x02]`
struct ByteList<'a>(&'a [u8]);

impl Display for ByteList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (index, byte) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "0x{byte:02x}")?;
        }
        f.write_char(']')
    }
}

/// Text up to the first NUL, quoted.
struct Quoted<'a>(&'a [u8]);

impl Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|byte| *byte == 0).unwrap_or(self.0.len());
        write!(f, "\"{}\"", String::from_utf8_lossy(&self.0[..end]))
    }
}

/// A type code printed by name when known, otherwise as zero-padded hex.
struct TypeName {
    name: Option<&'static str>,
    code: u16,
    width: usize,
}

impl Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:0width$x}", self.code, width = self.width),
        }
    }
}

fn chunk_type(code: u8) -> TypeName {
    let name = match code {
        layout::CHUNK_DATA => Some("DATA"),
        layout::CHUNK_INIT => Some("INIT"),
        layout::CHUNK_INIT_ACK => Some("INIT_ACK"),
        layout::CHUNK_SACK => Some("SACK"),
        layout::CHUNK_HEARTBEAT => Some("HEARTBEAT"),
        layout::CHUNK_HEARTBEAT_ACK => Some("HEARTBEAT_ACK"),
        layout::CHUNK_ABORT => Some("ABORT"),
        layout::CHUNK_SHUTDOWN => Some("SHUTDOWN"),
        layout::CHUNK_SHUTDOWN_ACK => Some("SHUTDOWN_ACK"),
        layout::CHUNK_ERROR => Some("ERROR"),
        layout::CHUNK_COOKIE_ECHO => Some("COOKIE_ECHO"),
        layout::CHUNK_COOKIE_ACK => Some("COOKIE_ACK"),
        layout::CHUNK_ECNE => Some("ECNE"),
        layout::CHUNK_CWR => Some("CWR"),
        layout::CHUNK_SHUTDOWN_COMPLETE => Some("SHUTDOWN_COMPLETE"),
        layout::CHUNK_NR_SACK => Some("NR_SACK"),
        layout::CHUNK_I_DATA => Some("I_DATA"),
        layout::CHUNK_PAD => Some("PAD"),
        layout::CHUNK_FORWARD_TSN => Some("FORWARD_TSN"),
        layout::CHUNK_I_FORWARD_TSN => Some("I_FORWARD_TSN"),
        _ => None,
    };
    TypeName {
        name,
        code: u16::from(code),
        width: 2,
    }
}

fn parameter_type(code: u16) -> TypeName {
    let name = match code {
        layout::PARAM_HEARTBEAT_INFORMATION => Some("HEARTBEAT_INFORMATION"),
        layout::PARAM_IPV4_ADDRESS => Some("IPV4_ADDRESS"),
        layout::PARAM_IPV6_ADDRESS => Some("IPV6_ADDRESS"),
        layout::PARAM_STATE_COOKIE => Some("STATE_COOKIE"),
        layout::PARAM_UNRECOGNIZED_PARAMETER => Some("UNRECOGNIZED_PARAMETER"),
        layout::PARAM_COOKIE_PRESERVATIVE => Some("COOKIE_PRESERVATIVE"),
        layout::PARAM_HOSTNAME_ADDRESS => Some("HOSTNAME_ADDRESS"),
        layout::PARAM_SUPPORTED_ADDRESS_TYPES => Some("SUPPORTED_ADDRESS_TYPES"),
        layout::PARAM_ECN_CAPABLE => Some("ECN_CAPABLE"),
        layout::PARAM_PAD => Some("PAD"),
        layout::PARAM_SUPPORTED_EXTENSIONS => Some("SUPPORTED_EXTENSIONS"),
        layout::PARAM_FORWARD_TSN_SUPPORTED => Some("FORWARD_TSN_SUPPORTED"),
        _ => None,
    };
    TypeName {
        name,
        code,
        width: 4,
    }
}

fn address_type(code: u16) -> TypeName {
    let name = match code {
        layout::PARAM_IPV4_ADDRESS => Some("IPv4"),
        layout::PARAM_IPV6_ADDRESS => Some("IPv6"),
        layout::PARAM_HOSTNAME_ADDRESS => Some("HOSTNAME"),
        _ => None,
    };
    TypeName {
        name,
        code,
        width: 4,
    }
}

/// `NAME[flgs=F` then `, record` for each nested record, then `]`.
fn write_with_records<T: Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    flags: Flags<'_>,
    records: &[T],
) -> fmt::Result {
    write!(f, "{name}[flgs={flags}")?;
    for record in records {
        write!(f, ", {record}")?;
    }
    f.write_char(']')
}

fn write_init(f: &mut fmt::Formatter<'_>, name: &str, init: &InitChunk) -> fmt::Result {
    write!(
        f,
        "{name}[flgs={}, tag={}, a_rwnd={}, os={}, is={}, tsn={}",
        hex_flags(init.flags),
        init.initiate_tag,
        init.a_rwnd,
        init.outbound_streams,
        init.inbound_streams,
        init.initial_tsn
    )?;
    for parameter in &init.parameters {
        write!(f, ", {parameter}")?;
    }
    f.write_char(']')
}

struct GapBlocks<'a>(&'a [(u16, u16)]);

impl Display for GapBlocks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (start, end)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{start}:{end}")?;
        }
        Ok(())
    }
}

impl Display for ForwardTsnStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.stream_id, self.stream_seq)
    }
}

impl Display for IForwardTsnStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{},{},{}}}",
            self.stream_id,
            u8::from(self.unordered),
            self.message_id
        )
    }
}

impl Display for DataChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DATA[flgs={}, len={}, tsn={}, sid={}, ssn={}, ppid={}]",
            Flags(self.flags, &DATA_FLAG_LETTERS),
            self.length,
            self.tsn,
            self.stream_id,
            self.stream_seq,
            self.ppid
        )
    }
}

impl Display for IDataChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = if self.is_first_fragment() { "ppid" } else { "fsn" };
        write!(
            f,
            "I-DATA[flgs={}, len={}, tsn={}, sid={}, mid={}, {last}={}]",
            Flags(self.flags, &DATA_FLAG_LETTERS),
            self.length,
            self.tsn,
            self.stream_id,
            self.message_id,
            self.ppid_or_fsn
        )
    }
}

fn write_sack(f: &mut fmt::Formatter<'_>, name: &str, sack: &SackChunk, nr: bool) -> fmt::Result {
    write!(
        f,
        "{name}[flgs={}, cum_tsn={}, a_rwnd={}, gaps=[{}], ",
        hex_flags(sack.flags),
        sack.cum_tsn,
        sack.a_rwnd,
        GapBlocks(&sack.gaps)
    )?;
    if nr {
        write!(f, "nr-gaps=[{}], ", GapBlocks(&sack.nr_gaps))?;
    }
    write!(f, "dups=[{}]]", Joined(&sack.dups, ", "))
}

impl Display for SctpChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SctpChunk::Data(data) => data.fmt(f),
            SctpChunk::Init(init) => write_init(f, "INIT", init),
            SctpChunk::InitAck(init) => write_init(f, "INIT_ACK", init),
            SctpChunk::Sack(sack) => write_sack(f, "SACK", sack, false),
            SctpChunk::NrSack(sack) => write_sack(f, "NR-SACK", sack, true),
            SctpChunk::Heartbeat { flags, parameters } => {
                write_with_records(f, "HEARTBEAT", hex_flags(*flags), parameters)
            }
            SctpChunk::HeartbeatAck { flags, parameters } => {
                write_with_records(f, "HEARTBEAT_ACK", hex_flags(*flags), parameters)
            }
            SctpChunk::Abort { flags, causes } => {
                write_with_records(f, "ABORT", Flags(*flags, &T_FLAG_LETTERS), causes)
            }
            SctpChunk::Shutdown { flags, cum_tsn } => write!(
                f,
                "SHUTDOWN[flgs={}, cum_tsn={cum_tsn}]",
                hex_flags(*flags)
            ),
            SctpChunk::ShutdownAck { flags } => {
                write!(f, "SHUTDOWN_ACK[flgs={}]", hex_flags(*flags))
            }
            SctpChunk::Error { flags, causes } => {
                write_with_records(f, "ERROR", hex_flags(*flags), causes)
            }
            SctpChunk::CookieEcho { flags, length, .. } => {
                write!(f, "COOKIE_ECHO[flgs={}, len={length}]", hex_flags(*flags))
            }
            SctpChunk::CookieAck { flags } => write!(f, "COOKIE_ACK[flgs={}]", hex_flags(*flags)),
            SctpChunk::Ecne { flags, lowest_tsn } => {
                write!(f, "ECNE[flgs={}, tsn={lowest_tsn}]", hex_flags(*flags))
            }
            SctpChunk::Cwr { flags, lowest_tsn } => {
                write!(f, "CWR[flgs={}, tsn={lowest_tsn}]", hex_flags(*flags))
            }
            SctpChunk::ShutdownComplete { flags } => write!(
                f,
                "SHUTDOWN_COMPLETE[flgs={}]",
                Flags(*flags, &T_FLAG_LETTERS)
            ),
            SctpChunk::ForwardTsn {
                flags,
                length,
                cum_tsn,
                streams,
            } => write!(
                f,
                "FORWARD_TSN[flgs={}, len={length}, cum_tsn={cum_tsn}, ids=[{}]]",
                hex_flags(*flags),
                Joined(streams, ",")
            ),
            SctpChunk::IForwardTsn {
                flags,
                length,
                cum_tsn,
                streams,
            } => write!(
                f,
                "I_FORWARD_TSN[flgs={}, len={length}, cum_tsn={cum_tsn}, ids=[{}]]",
                hex_flags(*flags),
                Joined(streams, ",")
            ),
            SctpChunk::IData(data) => data.fmt(f),
            SctpChunk::Pad { flags, length, .. } => {
                write!(f, "PAD[flgs={}, len={length}, val=...]", hex_flags(*flags))
            }
            SctpChunk::Unrecognized {
                chunk_type,
                flags,
                value,
            } => write!(
                f,
                "CHUNK[type=0x{chunk_type:02x}, flgs=0x{flags:02x}, value={}]",
                ByteList(value)
            ),
        }
    }
}

impl Display for SctpParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SctpParameter::HeartbeatInformation { length, .. } => {
                write!(f, "HEARTBEAT_INFORMATION[len={length}, val=...]")
            }
            SctpParameter::Ipv4Address(addr) => write!(f, "IPV4_ADDRESS[addr={addr}]"),
            SctpParameter::Ipv6Address(addr) => write!(f, "IPV6_ADDRESS[addr={addr}]"),
            SctpParameter::StateCookie { length, .. } => {
                write!(f, "STATE_COOKIE[len={length}, val=...]")
            }
            SctpParameter::UnrecognizedParameter(parameters) => {
                write!(f, "UNRECOGNIZED_PARAMETER[params=[{}]]", Joined(parameters, ", "))
            }
            SctpParameter::CookiePreservative(increment) => {
                write!(f, "COOKIE_PRESERVATIVE[incr={increment}]")
            }
            SctpParameter::HostnameAddress(name) => {
                write!(f, "HOSTNAME_ADDRESS[addr={}]", Quoted(name))
            }
            SctpParameter::SupportedAddressTypes(types) => {
                let names: Vec<TypeName> = types.iter().copied().map(address_type).collect();
                write!(f, "SUPPORTED_ADDRESS_TYPES[types=[{}]]", Joined(&names, ", "))
            }
            SctpParameter::EcnCapable => f.write_str("ECN_CAPABLE[]"),
            SctpParameter::ForwardTsnSupported => f.write_str("FORWARD_TSN_SUPPORTED[]"),
            SctpParameter::SupportedExtensions(types) => {
                let names: Vec<TypeName> = types.iter().copied().map(chunk_type).collect();
                write!(f, "SUPPORTED_EXTENSIONS[types=[{}]]", Joined(&names, ", "))
            }
            SctpParameter::Pad { length, .. } => write!(f, "PAD[len={length}, val=...]"),
            SctpParameter::Unrecognized {
                parameter_type,
                value,
            } => write!(
                f,
                "PARAMETER[type=0x{parameter_type:04x}, value={}]",
                ByteList(value)
            ),
        }
    }
}

impl Display for SctpCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SctpCause::InvalidStreamIdentifier(sid) => {
                write!(f, "INVALID_STREAM_IDENTIFIER[sid={sid}]")
            }
            SctpCause::MissingMandatoryParameter(types) => {
                let names: Vec<TypeName> = types.iter().copied().map(parameter_type).collect();
                write!(f, "MISSING_MANDATORY_PARAMETER[types=[{}]]", Joined(&names, ", "))
            }
            SctpCause::StaleCookieError(staleness) => {
                write!(f, "STALE_COOKIE_ERROR[staleness={staleness}]")
            }
            SctpCause::OutOfResources => f.write_str("OUT_OF_RESOURCES[]"),
            SctpCause::UnresolvableAddress(parameter) => {
                write!(f, "UNRESOLVABLE_ADDRESS[param={parameter}]")
            }
            SctpCause::UnrecognizedChunkType(chunk) => {
                write!(f, "UNRECOGNIZED_CHUNK_TYPE[chk={chunk}]")
            }
            SctpCause::InvalidMandatoryParameter => f.write_str("INVALID_MANDATORY_PARAMETER[]"),
            SctpCause::UnrecognizedParameters(parameters) => {
                write!(f, "UNRECOGNIZED_PARAMETERS[{}]", Joined(parameters, ", "))
            }
            SctpCause::NoUserData(tsn) => write!(f, "NO_USER_DATA[tsn={tsn}]"),
            SctpCause::CookieReceivedWhileShutdown => {
                f.write_str("COOKIE_RECEIVED_WHILE_SHUTDOWN[]")
            }
            SctpCause::RestartWithNewAddresses(addresses) => {
                write!(f, "RESTART_WITH_NEW_ADDRESSES[{}]", Joined(addresses, ", "))
            }
            SctpCause::UserInitiatedAbort(reason) => {
                write!(f, "USER_INITIATED_ABORT[info={}]", Quoted(reason))
            }
            SctpCause::ProtocolViolation(info) => {
                write!(f, "PROTOCOL_VIOLATION[info={}]", Quoted(info))
            }
            SctpCause::Unrecognized { code, value } => {
                write!(f, "CAUSE[code=0x{code:04x}, value={}]", ByteList(value))
            }
        }
    }
}
