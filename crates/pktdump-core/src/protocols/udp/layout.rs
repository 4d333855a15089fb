pub const LAYER: &str = "udp";
pub const LITE_LAYER: &str = "udplite";

pub const HEADER_LEN: usize = 8;
/// Coverage value meaning "the whole datagram".
pub const FULL_COVERAGE: u16 = 0;
