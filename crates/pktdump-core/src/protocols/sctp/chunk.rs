//! Chunk value decoding.

use super::layout;
use super::parameter::{SctpCause, SctpParameter, decode_causes, decode_parameters};
use super::parser::{
    require_depth, require_entries, require_exact_len, require_min_len, value_cursor,
};
use crate::protocols::common::ByteCursor;
use crate::protocols::common::tlv::TlvRecord;
use crate::protocols::error::ParseError;

const LAYER: &str = layout::CHUNK_LAYER;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    pub flags: u8,
    pub length: u16,
    pub tsn: u32,
    pub stream_id: u16,
    pub stream_seq: u16,
    pub ppid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IDataChunk {
    pub flags: u8,
    pub length: u16,
    pub tsn: u32,
    pub stream_id: u16,
    pub message_id: u32,
    /// Payload protocol identifier on the first fragment, fragment sequence
    /// number on the others.
    pub ppid_or_fsn: u32,
}

impl IDataChunk {
    pub fn is_first_fragment(&self) -> bool {
        self.flags & layout::FLAG_DATA_BEGINNING != 0
    }
}

/// Shared body of INIT and INIT_ACK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitChunk {
    pub flags: u8,
    pub initiate_tag: u32,
    pub a_rwnd: u32,
    pub outbound_streams: u16,
    pub inbound_streams: u16,
    pub initial_tsn: u32,
    pub parameters: Vec<SctpParameter>,
}

/// Shared body of SACK and NR-SACK; `nr_gaps` is always empty for SACK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SackChunk {
    pub flags: u8,
    pub cum_tsn: u32,
    pub a_rwnd: u32,
    pub gaps: Vec<(u16, u16)>,
    pub nr_gaps: Vec<(u16, u16)>,
    pub dups: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardTsnStream {
    pub stream_id: u16,
    pub stream_seq: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IForwardTsnStream {
    pub stream_id: u16,
    pub unordered: bool,
    pub message_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SctpChunk {
    Data(DataChunk),
    Init(InitChunk),
    InitAck(InitChunk),
    Sack(SackChunk),
    NrSack(SackChunk),
    Heartbeat {
        flags: u8,
        parameters: Vec<SctpParameter>,
    },
    HeartbeatAck {
        flags: u8,
        parameters: Vec<SctpParameter>,
    },
    Abort {
        flags: u8,
        causes: Vec<SctpCause>,
    },
    Shutdown {
        flags: u8,
        cum_tsn: u32,
    },
    ShutdownAck {
        flags: u8,
    },
    Error {
        flags: u8,
        causes: Vec<SctpCause>,
    },
    CookieEcho {
        flags: u8,
        length: u16,
        cookie: Vec<u8>,
    },
    CookieAck {
        flags: u8,
    },
    Ecne {
        flags: u8,
        lowest_tsn: u32,
    },
    Cwr {
        flags: u8,
        lowest_tsn: u32,
    },
    ShutdownComplete {
        flags: u8,
    },
    ForwardTsn {
        flags: u8,
        length: u16,
        cum_tsn: u32,
        streams: Vec<ForwardTsnStream>,
    },
    IForwardTsn {
        flags: u8,
        length: u16,
        cum_tsn: u32,
        streams: Vec<IForwardTsnStream>,
    },
    IData(IDataChunk),
    Pad {
        flags: u8,
        length: u16,
        padding: Vec<u8>,
    },
    Unrecognized {
        chunk_type: u8,
        flags: u8,
        value: Vec<u8>,
    },
}

impl SctpChunk {
    pub fn flags(&self) -> u8 {
        match self {
            SctpChunk::Data(DataChunk { flags, .. })
            | SctpChunk::IData(IDataChunk { flags, .. })
            | SctpChunk::Init(InitChunk { flags, .. })
            | SctpChunk::InitAck(InitChunk { flags, .. })
            | SctpChunk::Sack(SackChunk { flags, .. })
            | SctpChunk::NrSack(SackChunk { flags, .. })
            | SctpChunk::Heartbeat { flags, .. }
            | SctpChunk::HeartbeatAck { flags, .. }
            | SctpChunk::Abort { flags, .. }
            | SctpChunk::Shutdown { flags, .. }
            | SctpChunk::ShutdownAck { flags }
            | SctpChunk::Error { flags, .. }
            | SctpChunk::CookieEcho { flags, .. }
            | SctpChunk::CookieAck { flags }
            | SctpChunk::Ecne { flags, .. }
            | SctpChunk::Cwr { flags, .. }
            | SctpChunk::ShutdownComplete { flags }
            | SctpChunk::ForwardTsn { flags, .. }
            | SctpChunk::IForwardTsn { flags, .. }
            | SctpChunk::Pad { flags, .. }
            | SctpChunk::Unrecognized { flags, .. } => *flags,
        }
    }

    pub fn chunk_type(&self) -> u8 {
        match self {
            SctpChunk::Data(_) => layout::CHUNK_DATA,
            SctpChunk::Init(_) => layout::CHUNK_INIT,
            SctpChunk::InitAck(_) => layout::CHUNK_INIT_ACK,
            SctpChunk::Sack(_) => layout::CHUNK_SACK,
            SctpChunk::NrSack(_) => layout::CHUNK_NR_SACK,
            SctpChunk::Heartbeat { .. } => layout::CHUNK_HEARTBEAT,
            SctpChunk::HeartbeatAck { .. } => layout::CHUNK_HEARTBEAT_ACK,
            SctpChunk::Abort { .. } => layout::CHUNK_ABORT,
            SctpChunk::Shutdown { .. } => layout::CHUNK_SHUTDOWN,
            SctpChunk::ShutdownAck { .. } => layout::CHUNK_SHUTDOWN_ACK,
            SctpChunk::Error { .. } => layout::CHUNK_ERROR,
            SctpChunk::CookieEcho { .. } => layout::CHUNK_COOKIE_ECHO,
            SctpChunk::CookieAck { .. } => layout::CHUNK_COOKIE_ACK,
            SctpChunk::Ecne { .. } => layout::CHUNK_ECNE,
            SctpChunk::Cwr { .. } => layout::CHUNK_CWR,
            SctpChunk::ShutdownComplete { .. } => layout::CHUNK_SHUTDOWN_COMPLETE,
            SctpChunk::ForwardTsn { .. } => layout::CHUNK_FORWARD_TSN,
            SctpChunk::IForwardTsn { .. } => layout::CHUNK_I_FORWARD_TSN,
            SctpChunk::IData(_) => layout::CHUNK_I_DATA,
            SctpChunk::Pad { .. } => layout::CHUNK_PAD,
            SctpChunk::Unrecognized { chunk_type, .. } => *chunk_type,
        }
    }
}

/// Decode one chunk; `depth` is 0 for chunks of the packet itself.
pub(crate) fn decode_chunk(record: &TlvRecord<'_>, depth: usize) -> Result<SctpChunk, ParseError> {
    require_depth(record, depth, LAYER)?;
    let flags = record.flags;
    let mut value = value_cursor(record, LAYER);
    let Ok(chunk_type) = u8::try_from(record.type_code) else {
        return Err(ParseError::length(
            LAYER,
            record.offset,
            "chunk type wider than one byte",
        ));
    };

    let chunk = match chunk_type {
        layout::CHUNK_DATA => {
            require_min_len(record, layout::DATA_MIN_LEN, LAYER)?;
            SctpChunk::Data(DataChunk {
                flags,
                length: record.length,
                tsn: value.read_u32_be()?,
                stream_id: value.read_u16_be()?,
                stream_seq: value.read_u16_be()?,
                ppid: value.read_u32_be()?,
            })
        }
        layout::CHUNK_INIT | layout::CHUNK_INIT_ACK => {
            require_min_len(record, layout::INIT_MIN_LEN, LAYER)?;
            let init = InitChunk {
                flags,
                initiate_tag: value.read_u32_be()?,
                a_rwnd: value.read_u32_be()?,
                outbound_streams: value.read_u16_be()?,
                inbound_streams: value.read_u16_be()?,
                initial_tsn: value.read_u32_be()?,
                parameters: decode_parameters(&mut value, depth + 1)?,
            };
            if chunk_type == layout::CHUNK_INIT {
                SctpChunk::Init(init)
            } else {
                SctpChunk::InitAck(init)
            }
        }
        layout::CHUNK_SACK => {
            require_min_len(record, layout::SACK_MIN_LEN, LAYER)?;
            let cum_tsn = value.read_u32_be()?;
            let a_rwnd = value.read_u32_be()?;
            let gap_count = usize::from(value.read_u16_be()?);
            let dup_count = usize::from(value.read_u16_be()?);
            require_sack_len(record, value.remaining(), gap_count, dup_count)?;
            SctpChunk::Sack(SackChunk {
                flags,
                cum_tsn,
                a_rwnd,
                gaps: read_gap_blocks(&mut value, gap_count)?,
                nr_gaps: Vec::new(),
                dups: read_tsns(&mut value, dup_count)?,
            })
        }
        layout::CHUNK_NR_SACK => {
            require_min_len(record, layout::NR_SACK_MIN_LEN, LAYER)?;
            let cum_tsn = value.read_u32_be()?;
            let a_rwnd = value.read_u32_be()?;
            let gap_count = usize::from(value.read_u16_be()?);
            let nr_gap_count = usize::from(value.read_u16_be()?);
            let dup_count = usize::from(value.read_u16_be()?);
            let _reserved = value.read_u16_be()?;
            require_sack_len(record, value.remaining(), gap_count + nr_gap_count, dup_count)?;
            SctpChunk::NrSack(SackChunk {
                flags,
                cum_tsn,
                a_rwnd,
                gaps: read_gap_blocks(&mut value, gap_count)?,
                nr_gaps: read_gap_blocks(&mut value, nr_gap_count)?,
                dups: read_tsns(&mut value, dup_count)?,
            })
        }
        layout::CHUNK_HEARTBEAT => SctpChunk::Heartbeat {
            flags,
            parameters: decode_parameters(&mut value, depth + 1)?,
        },
        layout::CHUNK_HEARTBEAT_ACK => SctpChunk::HeartbeatAck {
            flags,
            parameters: decode_parameters(&mut value, depth + 1)?,
        },
        layout::CHUNK_ABORT => SctpChunk::Abort {
            flags,
            causes: decode_causes(&mut value, depth + 1)?,
        },
        layout::CHUNK_ERROR => SctpChunk::Error {
            flags,
            causes: decode_causes(&mut value, depth + 1)?,
        },
        layout::CHUNK_SHUTDOWN => {
            require_exact_len(record, layout::SHUTDOWN_LEN, LAYER)?;
            SctpChunk::Shutdown {
                flags,
                cum_tsn: value.read_u32_be()?,
            }
        }
        layout::CHUNK_SHUTDOWN_ACK => {
            require_exact_len(record, layout::SHUTDOWN_ACK_LEN, LAYER)?;
            SctpChunk::ShutdownAck { flags }
        }
        layout::CHUNK_COOKIE_ECHO => SctpChunk::CookieEcho {
            flags,
            length: record.length,
            cookie: value.take_rest().to_vec(),
        },
        layout::CHUNK_COOKIE_ACK => {
            require_exact_len(record, layout::COOKIE_ACK_LEN, LAYER)?;
            SctpChunk::CookieAck { flags }
        }
        layout::CHUNK_ECNE => {
            require_exact_len(record, layout::ECNE_LEN, LAYER)?;
            SctpChunk::Ecne {
                flags,
                lowest_tsn: value.read_u32_be()?,
            }
        }
        layout::CHUNK_CWR => {
            require_exact_len(record, layout::CWR_LEN, LAYER)?;
            SctpChunk::Cwr {
                flags,
                lowest_tsn: value.read_u32_be()?,
            }
        }
        layout::CHUNK_SHUTDOWN_COMPLETE => {
            require_exact_len(record, layout::SHUTDOWN_COMPLETE_LEN, LAYER)?;
            SctpChunk::ShutdownComplete { flags }
        }
        layout::CHUNK_FORWARD_TSN => {
            require_min_len(record, layout::FORWARD_TSN_MIN_LEN, LAYER)?;
            let cum_tsn = value.read_u32_be()?;
            let count = require_entries(&value, layout::FORWARD_TSN_ENTRY_LEN, record)?;
            let mut streams = Vec::with_capacity(count);
            for _ in 0..count {
                streams.push(ForwardTsnStream {
                    stream_id: value.read_u16_be()?,
                    stream_seq: value.read_u16_be()?,
                });
            }
            SctpChunk::ForwardTsn {
                flags,
                length: record.length,
                cum_tsn,
                streams,
            }
        }
        layout::CHUNK_I_FORWARD_TSN => {
            require_min_len(record, layout::I_FORWARD_TSN_MIN_LEN, LAYER)?;
            let cum_tsn = value.read_u32_be()?;
            let count = require_entries(&value, layout::I_FORWARD_TSN_ENTRY_LEN, record)?;
            let mut streams = Vec::with_capacity(count);
            for _ in 0..count {
                let stream_id = value.read_u16_be()?;
                let entry_flags = value.read_u16_be()?;
                streams.push(IForwardTsnStream {
                    stream_id,
                    unordered: entry_flags & layout::I_FORWARD_TSN_UNORDERED != 0,
                    message_id: value.read_u32_be()?,
                });
            }
            SctpChunk::IForwardTsn {
                flags,
                length: record.length,
                cum_tsn,
                streams,
            }
        }
        layout::CHUNK_I_DATA => {
            require_min_len(record, layout::I_DATA_MIN_LEN, LAYER)?;
            let tsn = value.read_u32_be()?;
            let stream_id = value.read_u16_be()?;
            let _reserved = value.read_u16_be()?;
            SctpChunk::IData(IDataChunk {
                flags,
                length: record.length,
                tsn,
                stream_id,
                message_id: value.read_u32_be()?,
                ppid_or_fsn: value.read_u32_be()?,
            })
        }
        layout::CHUNK_PAD => SctpChunk::Pad {
            flags,
            length: record.length,
            padding: value.take_rest().to_vec(),
        },
        _ => SctpChunk::Unrecognized {
            chunk_type,
            flags,
            value: value.take_rest().to_vec(),
        },
    };
    Ok(chunk)
}

fn require_sack_len(
    record: &TlvRecord<'_>,
    remaining: usize,
    gap_blocks: usize,
    dups: usize,
) -> Result<(), ParseError> {
    let expected = gap_blocks * layout::GAP_BLOCK_LEN + dups * layout::DUP_TSN_LEN;
    if remaining != expected {
        return Err(ParseError::length(
            LAYER,
            record.offset,
            format!(
                "{gap_blocks} gap blocks and {dups} duplicate TSNs need {expected} bytes, chunk has {remaining}"
            ),
        ));
    }
    Ok(())
}

fn read_gap_blocks(
    value: &mut ByteCursor<'_>,
    count: usize,
) -> Result<Vec<(u16, u16)>, ParseError> {
    (0..count)
        .map(|_| -> Result<(u16, u16), ParseError> {
            Ok((value.read_u16_be()?, value.read_u16_be()?))
        })
        .collect()
}

fn read_tsns(
    value: &mut ByteCursor<'_>,
    count: usize,
) -> Result<Vec<u32>, ParseError> {
    (0..count).map(|_| value.read_u32_be()).collect()
}

#[cfg(test)]
mod tests {
    use super::{IForwardTsnStream, SackChunk, SctpChunk, decode_chunk};
    use crate::protocols::common::ByteCursor;
    use crate::protocols::common::tlv::{TlvFraming, TlvIter};
    use crate::protocols::error::{ParseError, ParseErrorKind};
    use crate::protocols::sctp::layout;

    fn decode(bytes: &[u8]) -> Result<SctpChunk, ParseError> {
        let mut iter = TlvIter::new(
            ByteCursor::new(bytes, layout::CHUNK_LAYER),
            TlvFraming::SCTP_CHUNK,
        );
        let record = iter.next().expect("one record")?;
        decode_chunk(&record, 0)
    }

    #[test]
    fn decode_data_chunk() {
        let chunk = decode(&[
            0x00, 0x0f, 0x00, 0x13, 0x01, 0x02, 0x03, 0x04, 0x00, 0xff, 0x01, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00,
        ])
        .unwrap();
        let SctpChunk::Data(data) = chunk else {
            panic!("expected DATA, got {chunk:?}");
        };
        assert_eq!(data.flags, 0x0f);
        assert_eq!(data.length, 19);
        assert_eq!(data.tsn, 16_909_060);
        assert_eq!(data.stream_id, 255);
        assert_eq!(data.stream_seq, 256);
    }

    #[test]
    fn decode_sack_blocks_and_dups() {
        let chunk = decode(&[
            0x03, 0x00, 0x00, 0x18, 0x01, 0x02, 0x03, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x01, 0x00, 0x05, 0x00, 0x0f, 0x01, 0x02, 0x03, 0x04,
        ])
        .unwrap();
        assert_eq!(
            chunk,
            SctpChunk::Sack(SackChunk {
                flags: 0,
                cum_tsn: 16_909_060,
                a_rwnd: 65_536,
                gaps: vec![(5, 15)],
                nr_gaps: Vec::new(),
                dups: vec![16_909_060],
            })
        );
    }

    #[test]
    fn sack_counts_must_fill_the_chunk() {
        let err = decode(&[
            0x03, 0x00, 0x00, 0x14, 0x01, 0x02, 0x03, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, 0x05, 0x00, 0x0f,
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::LengthViolation);
    }

    #[test]
    fn decode_i_forward_tsn_entries() {
        let chunk = decode(&[
            0xc2, 0x00, 0x00, 0x10, 0xb5, 0xaa, 0xaf, 0x0f, 0x00, 0x01, 0x00, 0x01, 0x00,
            0x00, 0x01, 0x00,
        ])
        .unwrap();
        let SctpChunk::IForwardTsn { cum_tsn, streams, .. } = chunk else {
            panic!("expected I_FORWARD_TSN, got {chunk:?}");
        };
        assert_eq!(cum_tsn, 3_047_862_031);
        assert_eq!(
            streams,
            vec![IForwardTsnStream {
                stream_id: 1,
                unordered: true,
                message_id: 256,
            }]
        );
    }

    #[test]
    fn fixed_size_chunk_with_wrong_length_is_violation() {
        let err = decode(&[0x07, 0x00, 0x00, 0x0c, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::LengthViolation);
        assert_eq!(err.layer(), "sctp chunk");
    }

    #[test]
    fn short_data_chunk_is_violation() {
        let err = decode(&[0x00, 0x03, 0x00, 0x0c, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::LengthViolation);
    }

    #[test]
    fn unknown_chunk_keeps_its_bytes() {
        let chunk = decode(&[0xfe, 0x05, 0x00, 0x06, 0x01, 0x02, 0x00, 0x00]).unwrap();
        assert_eq!(
            chunk,
            SctpChunk::Unrecognized {
                chunk_type: 0xfe,
                flags: 0x05,
                value: vec![0x01, 0x02],
            }
        );
        assert_eq!(chunk.chunk_type(), 0xfe);
        assert_eq!(chunk.flags(), 0x05);
    }
}
