pub const LAYER: &str = "gre";

pub const BASE_HEADER_LEN: usize = 4;
pub const OPTIONAL_WORD_LEN: usize = 4;

pub const FLAG_CHECKSUM: u16 = 0x8000;
pub const FLAG_KEY: u16 = 0x2000;
pub const FLAG_SEQUENCE: u16 = 0x1000;
pub const VERSION_MASK: u16 = 0x0007;
