pub const LAYER: &str = "ipv4";

pub const VERSION: u8 = 4;
pub const MIN_HEADER_LEN: usize = 20;
pub const IHL_MASK: u8 = 0x0f;
pub const IHL_UNIT: usize = 4;

/// Identification, flags and fragment offset, skipped as one block.
pub const FRAGMENT_FIELDS_LEN: usize = 4;
pub const CHECKSUM_LEN: usize = 2;
pub const ADDR_LEN: usize = 4;
