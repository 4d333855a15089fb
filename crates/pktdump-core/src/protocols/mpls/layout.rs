pub const LAYER: &str = "mpls";

pub const ENTRY_LEN: usize = 4;

pub const LABEL_SHIFT: u32 = 12;
pub const TC_SHIFT: u32 = 9;
pub const TC_MASK: u32 = 0x7;
pub const BOTTOM_OF_STACK: u32 = 0x100;
pub const TTL_MASK: u32 = 0xff;
