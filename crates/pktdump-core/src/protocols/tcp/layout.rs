pub const LAYER: &str = "tcp";
pub const OPTION_LAYER: &str = "tcp option";

pub const MIN_HEADER_LEN: usize = 20;
pub const DATA_OFFSET_SHIFT: u8 = 4;
pub const DATA_OFFSET_UNIT: usize = 4;
/// Checksum and urgent pointer, skipped as one block.
pub const TRAILING_FIELDS_LEN: usize = 4;

pub const OPT_EOL: u8 = 0;
pub const OPT_NOP: u8 = 1;
pub const OPT_MSS: u8 = 2;
pub const OPT_WINDOW_SCALE: u8 = 3;
pub const OPT_SACK_PERMITTED: u8 = 4;
pub const OPT_SACK: u8 = 5;
pub const OPT_TIMESTAMP: u8 = 8;
pub const OPT_FAST_OPEN: u8 = 34;

/// Kind and length bytes in front of every multi-byte option.
pub const OPT_HEADER_LEN: usize = 2;
pub const OPT_MSS_LEN: usize = 4;
pub const OPT_WINDOW_SCALE_LEN: usize = 3;
pub const OPT_SACK_PERMITTED_LEN: usize = 2;
pub const OPT_TIMESTAMP_LEN: usize = 10;
pub const SACK_BLOCK_LEN: usize = 8;
