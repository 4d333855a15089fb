pub const LAYER: &str = "ethernet";

pub const MAC_LEN: usize = 6;
pub const HEADER_LEN: usize = 2 * MAC_LEN + 2;
