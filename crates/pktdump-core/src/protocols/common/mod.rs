pub mod cursor;
pub mod numbers;
pub mod tlv;

pub use cursor::ByteCursor;
