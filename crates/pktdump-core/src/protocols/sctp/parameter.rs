//! Parameter and error-cause decoding.

use std::net::{Ipv4Addr, Ipv6Addr};

use super::chunk::{SctpChunk, decode_chunk};
use super::layout;
use super::parser::{
    require_depth, require_entries, require_exact_len, require_min_len, value_cursor,
};
use crate::protocols::common::ByteCursor;
use crate::protocols::common::tlv::{TlvFraming, TlvIter, TlvRecord};
use crate::protocols::error::ParseError;

/// Parameters carried by INIT, INIT_ACK and HEARTBEAT chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SctpParameter {
    HeartbeatInformation { length: u16, info: Vec<u8> },
    Ipv4Address(Ipv4Addr),
    Ipv6Address(Ipv6Addr),
    StateCookie { length: u16, cookie: Vec<u8> },
    UnrecognizedParameter(Vec<SctpParameter>),
    CookiePreservative(u32),
    /// Raw hostname bytes, NUL padding included.
    HostnameAddress(Vec<u8>),
    SupportedAddressTypes(Vec<u16>),
    EcnCapable,
    ForwardTsnSupported,
    /// Chunk type codes.
    SupportedExtensions(Vec<u8>),
    Pad { length: u16, padding: Vec<u8> },
    Unrecognized { parameter_type: u16, value: Vec<u8> },
}

/// Error causes carried by ABORT and ERROR chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SctpCause {
    InvalidStreamIdentifier(u16),
    /// Parameter type codes.
    MissingMandatoryParameter(Vec<u16>),
    /// Measure of staleness in microseconds.
    StaleCookieError(u32),
    OutOfResources,
    UnresolvableAddress(Box<SctpParameter>),
    UnrecognizedChunkType(Box<SctpChunk>),
    InvalidMandatoryParameter,
    UnrecognizedParameters(Vec<SctpParameter>),
    NoUserData(u32),
    CookieReceivedWhileShutdown,
    RestartWithNewAddresses(Vec<SctpParameter>),
    UserInitiatedAbort(Vec<u8>),
    ProtocolViolation(Vec<u8>),
    Unrecognized { code: u16, value: Vec<u8> },
}

/// Decode every parameter left in the cursor region.
pub(crate) fn decode_parameters(
    cursor: &mut ByteCursor<'_>,
    depth: usize,
) -> Result<Vec<SctpParameter>, ParseError> {
    let region = cursor.split(cursor.remaining(), layout::PARAMETER_LAYER)?;
    TlvIter::new(region, TlvFraming::SCTP_PARAMETER)
        .map(|record| record.and_then(|record| decode_parameter(&record, depth)))
        .collect()
}

/// Decode every error cause left in the cursor region.
pub(crate) fn decode_causes(
    cursor: &mut ByteCursor<'_>,
    depth: usize,
) -> Result<Vec<SctpCause>, ParseError> {
    let region = cursor.split(cursor.remaining(), layout::CAUSE_LAYER)?;
    TlvIter::new(region, TlvFraming::SCTP_PARAMETER)
        .map(|record| record.and_then(|record| decode_cause(&record, depth)))
        .collect()
}

fn decode_parameter(record: &TlvRecord<'_>, depth: usize) -> Result<SctpParameter, ParseError> {
    const LAYER: &str = layout::PARAMETER_LAYER;
    require_depth(record, depth, LAYER)?;
    let mut value = value_cursor(record, LAYER);

    let parameter = match record.type_code {
        layout::PARAM_HEARTBEAT_INFORMATION => SctpParameter::HeartbeatInformation {
            length: record.length,
            info: value.take_rest().to_vec(),
        },
        layout::PARAM_IPV4_ADDRESS => {
            require_exact_len(record, layout::IPV4_ADDRESS_LEN, LAYER)?;
            SctpParameter::Ipv4Address(Ipv4Addr::from(value.read_array::<4>()?))
        }
        layout::PARAM_IPV6_ADDRESS => {
            require_exact_len(record, layout::IPV6_ADDRESS_LEN, LAYER)?;
            SctpParameter::Ipv6Address(Ipv6Addr::from(value.read_array::<16>()?))
        }
        layout::PARAM_STATE_COOKIE => SctpParameter::StateCookie {
            length: record.length,
            cookie: value.take_rest().to_vec(),
        },
        layout::PARAM_UNRECOGNIZED_PARAMETER => {
            SctpParameter::UnrecognizedParameter(decode_parameters(&mut value, depth + 1)?)
        }
        layout::PARAM_COOKIE_PRESERVATIVE => {
            require_exact_len(record, layout::COOKIE_PRESERVATIVE_LEN, LAYER)?;
            SctpParameter::CookiePreservative(value.read_u32_be()?)
        }
        layout::PARAM_HOSTNAME_ADDRESS => {
            SctpParameter::HostnameAddress(value.take_rest().to_vec())
        }
        layout::PARAM_SUPPORTED_ADDRESS_TYPES => {
            let count = require_entries(&value, layout::ADDRESS_TYPE_LEN, record)?;
            let types = (0..count)
                .map(|_| value.read_u16_be())
                .collect::<Result<Vec<_>, _>>()?;
            SctpParameter::SupportedAddressTypes(types)
        }
        layout::PARAM_ECN_CAPABLE => {
            require_exact_len(record, layout::ECN_CAPABLE_LEN, LAYER)?;
            SctpParameter::EcnCapable
        }
        layout::PARAM_FORWARD_TSN_SUPPORTED => {
            require_exact_len(record, layout::FORWARD_TSN_SUPPORTED_LEN, LAYER)?;
            SctpParameter::ForwardTsnSupported
        }
        layout::PARAM_SUPPORTED_EXTENSIONS => {
            SctpParameter::SupportedExtensions(value.take_rest().to_vec())
        }
        layout::PARAM_PAD => SctpParameter::Pad {
            length: record.length,
            padding: value.take_rest().to_vec(),
        },
        parameter_type => SctpParameter::Unrecognized {
            parameter_type,
            value: value.take_rest().to_vec(),
        },
    };
    Ok(parameter)
}

fn decode_cause(record: &TlvRecord<'_>, depth: usize) -> Result<SctpCause, ParseError> {
    const LAYER: &str = layout::CAUSE_LAYER;
    require_depth(record, depth, LAYER)?;
    let mut value = value_cursor(record, LAYER);

    let cause = match record.type_code {
        layout::CAUSE_INVALID_STREAM_IDENTIFIER => {
            require_exact_len(record, layout::INVALID_STREAM_IDENTIFIER_LEN, LAYER)?;
            SctpCause::InvalidStreamIdentifier(value.read_u16_be()?)
        }
        layout::CAUSE_MISSING_MANDATORY_PARAMETER => {
            require_min_len(record, layout::MISSING_MANDATORY_PARAMETER_MIN_LEN, LAYER)?;
            let declared = value.read_u32_be()?;
            let count = require_entries(&value, layout::PARAMETER_TYPE_LEN, record)?;
            if usize::try_from(declared).ok() != Some(count) {
                return Err(ParseError::length(
                    LAYER,
                    record.offset,
                    format!("{declared} missing parameters declared, {count} present"),
                ));
            }
            let types = (0..count)
                .map(|_| value.read_u16_be())
                .collect::<Result<Vec<_>, _>>()?;
            SctpCause::MissingMandatoryParameter(types)
        }
        layout::CAUSE_STALE_COOKIE_ERROR => {
            require_exact_len(record, layout::STALE_COOKIE_ERROR_LEN, LAYER)?;
            SctpCause::StaleCookieError(value.read_u32_be()?)
        }
        layout::CAUSE_OUT_OF_RESOURCES => {
            require_exact_len(record, layout::OUT_OF_RESOURCES_LEN, LAYER)?;
            SctpCause::OutOfResources
        }
        layout::CAUSE_UNRESOLVABLE_ADDRESS => {
            let region = value.split(value.remaining(), layout::PARAMETER_LAYER)?;
            let nested = TlvIter::new(region, TlvFraming::SCTP_PARAMETER)
                .map(|nested| nested.and_then(|nested| decode_parameter(&nested, depth + 1)));
            SctpCause::UnresolvableAddress(Box::new(exactly_one(nested, record)?))
        }
        layout::CAUSE_UNRECOGNIZED_CHUNK_TYPE => {
            let region = value.split(value.remaining(), layout::CHUNK_LAYER)?;
            let nested = TlvIter::new(region, TlvFraming::SCTP_CHUNK)
                .map(|nested| nested.and_then(|nested| decode_chunk(&nested, depth + 1)));
            SctpCause::UnrecognizedChunkType(Box::new(exactly_one(nested, record)?))
        }
        layout::CAUSE_INVALID_MANDATORY_PARAMETER => {
            require_exact_len(record, layout::INVALID_MANDATORY_PARAMETER_LEN, LAYER)?;
            SctpCause::InvalidMandatoryParameter
        }
        layout::CAUSE_UNRECOGNIZED_PARAMETERS => {
            SctpCause::UnrecognizedParameters(decode_parameters(&mut value, depth + 1)?)
        }
        layout::CAUSE_NO_USER_DATA => {
            require_exact_len(record, layout::NO_USER_DATA_LEN, LAYER)?;
            SctpCause::NoUserData(value.read_u32_be()?)
        }
        layout::CAUSE_COOKIE_RECEIVED_WHILE_SHUTDOWN => {
            require_exact_len(record, layout::COOKIE_RECEIVED_WHILE_SHUTDOWN_LEN, LAYER)?;
            SctpCause::CookieReceivedWhileShutdown
        }
        layout::CAUSE_RESTART_WITH_NEW_ADDRESSES => {
            SctpCause::RestartWithNewAddresses(decode_parameters(&mut value, depth + 1)?)
        }
        layout::CAUSE_USER_INITIATED_ABORT => {
            SctpCause::UserInitiatedAbort(value.take_rest().to_vec())
        }
        layout::CAUSE_PROTOCOL_VIOLATION => {
            SctpCause::ProtocolViolation(value.take_rest().to_vec())
        }
        code => SctpCause::Unrecognized {
            code,
            value: value.take_rest().to_vec(),
        },
    };
    Ok(cause)
}

fn exactly_one<T>(
    mut items: impl Iterator<Item = Result<T, ParseError>>,
    record: &TlvRecord<'_>,
) -> Result<T, ParseError> {
    let wrong_count = |found: &str| {
        ParseError::length(
            layout::CAUSE_LAYER,
            record.offset,
            format!(
                "cause 0x{:04x} must wrap exactly one record, found {found}",
                record.type_code
            ),
        )
    };
    let first = items.next().ok_or_else(|| wrong_count("none"))??;
    if items.next().is_some() {
        return Err(wrong_count("more than one"));
    }
    Ok(first)
}
