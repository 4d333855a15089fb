pub const LAYER: &str = "sctp";
pub const CHUNK_LAYER: &str = "sctp chunk";
pub const PARAMETER_LAYER: &str = "sctp parameter";
pub const CAUSE_LAYER: &str = "sctp cause";

/// Deepest record accepted inside another record (chunk > cause > parameter ...).
pub const MAX_NESTING_DEPTH: usize = 8;

pub const COMMON_HEADER_LEN: usize = 12;

// Chunk types.
pub const CHUNK_DATA: u8 = 0x00;
pub const CHUNK_INIT: u8 = 0x01;
pub const CHUNK_INIT_ACK: u8 = 0x02;
pub const CHUNK_SACK: u8 = 0x03;
pub const CHUNK_HEARTBEAT: u8 = 0x04;
pub const CHUNK_HEARTBEAT_ACK: u8 = 0x05;
pub const CHUNK_ABORT: u8 = 0x06;
pub const CHUNK_SHUTDOWN: u8 = 0x07;
pub const CHUNK_SHUTDOWN_ACK: u8 = 0x08;
pub const CHUNK_ERROR: u8 = 0x09;
pub const CHUNK_COOKIE_ECHO: u8 = 0x0a;
pub const CHUNK_COOKIE_ACK: u8 = 0x0b;
pub const CHUNK_ECNE: u8 = 0x0c;
pub const CHUNK_CWR: u8 = 0x0d;
pub const CHUNK_SHUTDOWN_COMPLETE: u8 = 0x0e;
pub const CHUNK_NR_SACK: u8 = 0x10;
pub const CHUNK_I_DATA: u8 = 0x40;
pub const CHUNK_PAD: u8 = 0x84;
pub const CHUNK_FORWARD_TSN: u8 = 0xc0;
pub const CHUNK_I_FORWARD_TSN: u8 = 0xc2;

// Chunk flag bits.
pub const FLAG_DATA_IMMEDIATE: u8 = 0x08;
pub const FLAG_DATA_UNORDERED: u8 = 0x04;
pub const FLAG_DATA_BEGINNING: u8 = 0x02;
pub const FLAG_DATA_END: u8 = 0x01;
pub const FLAG_T_BIT: u8 = 0x01;
/// U bit in the flags half-word of an I_FORWARD_TSN entry.
pub const I_FORWARD_TSN_UNORDERED: u16 = 0x0001;

// Declared chunk lengths.
pub const DATA_MIN_LEN: usize = 16;
pub const I_DATA_MIN_LEN: usize = 20;
pub const INIT_MIN_LEN: usize = 20;
pub const SACK_MIN_LEN: usize = 16;
pub const NR_SACK_MIN_LEN: usize = 20;
pub const SHUTDOWN_LEN: usize = 8;
pub const SHUTDOWN_ACK_LEN: usize = 4;
pub const COOKIE_ACK_LEN: usize = 4;
pub const ECNE_LEN: usize = 8;
pub const CWR_LEN: usize = 8;
pub const SHUTDOWN_COMPLETE_LEN: usize = 4;
pub const FORWARD_TSN_MIN_LEN: usize = 8;
pub const I_FORWARD_TSN_MIN_LEN: usize = 8;

pub const GAP_BLOCK_LEN: usize = 4;
pub const DUP_TSN_LEN: usize = 4;
pub const FORWARD_TSN_ENTRY_LEN: usize = 4;
pub const I_FORWARD_TSN_ENTRY_LEN: usize = 8;

// Parameter types.
pub const PARAM_HEARTBEAT_INFORMATION: u16 = 0x0001;
pub const PARAM_IPV4_ADDRESS: u16 = 0x0005;
pub const PARAM_IPV6_ADDRESS: u16 = 0x0006;
pub const PARAM_STATE_COOKIE: u16 = 0x0007;
pub const PARAM_UNRECOGNIZED_PARAMETER: u16 = 0x0008;
pub const PARAM_COOKIE_PRESERVATIVE: u16 = 0x0009;
pub const PARAM_HOSTNAME_ADDRESS: u16 = 0x000b;
pub const PARAM_SUPPORTED_ADDRESS_TYPES: u16 = 0x000c;
pub const PARAM_ECN_CAPABLE: u16 = 0x8000;
pub const PARAM_PAD: u16 = 0x8005;
pub const PARAM_SUPPORTED_EXTENSIONS: u16 = 0x8008;
pub const PARAM_FORWARD_TSN_SUPPORTED: u16 = 0xc000;

// Declared parameter lengths.
pub const IPV4_ADDRESS_LEN: usize = 8;
pub const IPV6_ADDRESS_LEN: usize = 20;
pub const COOKIE_PRESERVATIVE_LEN: usize = 8;
pub const ECN_CAPABLE_LEN: usize = 4;
pub const FORWARD_TSN_SUPPORTED_LEN: usize = 4;
pub const ADDRESS_TYPE_LEN: usize = 2;

// Error cause codes.
pub const CAUSE_INVALID_STREAM_IDENTIFIER: u16 = 0x0001;
pub const CAUSE_MISSING_MANDATORY_PARAMETER: u16 = 0x0002;
pub const CAUSE_STALE_COOKIE_ERROR: u16 = 0x0003;
pub const CAUSE_OUT_OF_RESOURCES: u16 = 0x0004;
pub const CAUSE_UNRESOLVABLE_ADDRESS: u16 = 0x0005;
pub const CAUSE_UNRECOGNIZED_CHUNK_TYPE: u16 = 0x0006;
pub const CAUSE_INVALID_MANDATORY_PARAMETER: u16 = 0x0007;
pub const CAUSE_UNRECOGNIZED_PARAMETERS: u16 = 0x0008;
pub const CAUSE_NO_USER_DATA: u16 = 0x0009;
pub const CAUSE_COOKIE_RECEIVED_WHILE_SHUTDOWN: u16 = 0x000a;
pub const CAUSE_RESTART_WITH_NEW_ADDRESSES: u16 = 0x000b;
pub const CAUSE_USER_INITIATED_ABORT: u16 = 0x000c;
pub const CAUSE_PROTOCOL_VIOLATION: u16 = 0x000d;

// Declared cause lengths.
pub const INVALID_STREAM_IDENTIFIER_LEN: usize = 8;
pub const MISSING_MANDATORY_PARAMETER_MIN_LEN: usize = 8;
pub const STALE_COOKIE_ERROR_LEN: usize = 8;
pub const OUT_OF_RESOURCES_LEN: usize = 4;
pub const INVALID_MANDATORY_PARAMETER_LEN: usize = 4;
pub const NO_USER_DATA_LEN: usize = 8;
pub const COOKIE_RECEIVED_WHILE_SHUTDOWN_LEN: usize = 4;
pub const PARAMETER_TYPE_LEN: usize = 2;
