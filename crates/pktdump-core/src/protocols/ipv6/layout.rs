pub const LAYER: &str = "ipv6";

pub const VERSION: u8 = 6;
pub const HEADER_LEN: usize = 40;
/// Version, traffic class and flow label.
pub const FLOW_WORD_LEN: usize = 4;
pub const ADDR_LEN: usize = 16;
