//! Offset/hex rendering of a raw buffer.

use std::fmt::{self, Write};

pub const BYTES_PER_LINE: usize = 16;

/// Append one `0xNNNN: xx xx … \n` line per 16 bytes; nothing for an empty buffer.
pub fn write_hex_dump<W: Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    for (index, line) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        write!(out, "0x{:04x}: ", index * BYTES_PER_LINE)?;
        for byte in line {
            write!(out, "{byte:02x} ")?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}

/// # Examples
/// ```
/// use pktdump_core::hex_dump;
///
/// assert_eq!(hex_dump(&[0x06, 0x01, 0x00, 0x04]), "0x0000: 06 01 00 04 \n");
/// assert_eq!(hex_dump(&[]), "");
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    HexDump(bytes).to_string()
}

struct HexDump<'a>(&'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex_dump(f, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{hex_dump, write_hex_dump};

    #[test]
    fn full_and_partial_lines() {
        let bytes: Vec<u8> = (0u8..20).collect();
        assert_eq!(
            hex_dump(&bytes),
            "0x0000: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f \n\
             0x0010: 10 11 12 13 \n"
        );
    }

    #[test]
    fn owned_dump_matches_streamed_dump() {
        let bytes: Vec<u8> = (0u8..=40).collect();
        let mut streamed = String::from("prefix\n");
        write_hex_dump(&mut streamed, &bytes).unwrap();
        assert_eq!(streamed, format!("prefix\n{}", hex_dump(&bytes)));
        assert_eq!(hex_dump(&bytes).lines().count(), 3);
    }

    #[test]
    fn exact_multiple_has_no_empty_trailing_line() {
        let dump = hex_dump(&[0xab; 32]);
        assert_eq!(dump.lines().count(), 2);
        assert!(dump.ends_with("ab \n"));
    }

    #[test]
    fn offsets_widen_past_four_digits() {
        let dump = hex_dump(&vec![0u8; 0x10010]);
        assert!(dump.ends_with(&format!("0x10000: {}\n", "00 ".repeat(16))));
    }
}
