use std::fmt::{self, Write};

use super::Joined;
use crate::protocols::tcp::{TcpFlags, TcpOption, TcpSegment};

/// Flag letters in print order.
const FLAG_LETTERS: [(TcpFlags, char); 8] = [
    (TcpFlags::FIN, 'F'),
    (TcpFlags::SYN, 'S'),
    (TcpFlags::RST, 'R'),
    (TcpFlags::PSH, 'P'),
    (TcpFlags::ACK, '.'),
    (TcpFlags::URG, 'U'),
    (TcpFlags::ECE, 'E'),
    (TcpFlags::CWR, 'W'),
];

/// `<flags> <seq>:<end>(<len>) [ack <n> ]win <n> [<options>]`
pub(super) fn write_segment<W: Write>(out: &mut W, segment: &TcpSegment) -> fmt::Result {
    for (flag, letter) in FLAG_LETTERS {
        if segment.flags.contains(flag) {
            out.write_char(letter)?;
        }
    }
    // Payload is bounded by 16-bit length fields.
    let len = segment.payload_len as u32;
    write!(
        out,
        " {}:{}({}) ",
        segment.sequence,
        segment.sequence.wrapping_add(len),
        len
    )?;
    if segment.flags.contains(TcpFlags::ACK) {
        write!(out, "ack {} ", segment.acknowledgment)?;
    }
    write!(out, "win {} ", segment.window)?;
    if !segment.options.is_empty() {
        write!(out, "<{}>", Joined(&segment.options, ","))?;
    }
    Ok(())
}

impl fmt::Display for TcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcpOption::EndOfList => f.write_str("eol"),
            TcpOption::NoOp => f.write_str("nop"),
            TcpOption::Mss(mss) => write!(f, "mss {mss}"),
            TcpOption::WindowScale(shift) => write!(f, "wscale {shift}"),
            TcpOption::SackPermitted => f.write_str("sackOK"),
            TcpOption::Sack(blocks) => {
                f.write_str("sack")?;
                for (left, right) in blocks {
                    write!(f, " {left}:{right}")?;
                }
                Ok(())
            }
            TcpOption::Timestamp { value, echo_reply } => {
                write!(f, "TS val {value} ecr {echo_reply}")
            }
            TcpOption::FastOpen(cookie) => {
                f.write_str("FO")?;
                if !cookie.is_empty() {
                    f.write_char(' ')?;
                    for byte in cookie {
                        write!(f, "{byte:02x}")?;
                    }
                }
                Ok(())
            }
            TcpOption::Unknown { kind, length } => write!(f, "opt-{kind} len {length}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::write_segment;
    use crate::protocols::tcp::{TcpFlags, TcpOption, TcpSegment};

    fn segment(flags: TcpFlags, options: Vec<TcpOption>, payload_len: usize) -> TcpSegment {
        TcpSegment {
            source_port: 8080,
            destination_port: 56268,
            sequence: 2_072_102_268,
            acknowledgment: 1,
            header_len: 20,
            flags,
            window: 453,
            options,
            payload_len,
        }
    }

    fn render(segment: &TcpSegment) -> String {
        let mut out = String::new();
        write_segment(&mut out, segment).unwrap();
        out
    }

    #[test]
    fn fin_ack_with_options() {
        let rendered = render(&segment(
            TcpFlags::FIN | TcpFlags::ACK,
            vec![
                TcpOption::NoOp,
                TcpOption::NoOp,
                TcpOption::Timestamp {
                    value: 117_573_699,
                    echo_reply: 5,
                },
            ],
            0,
        ));
        assert_eq!(
            rendered,
            "F. 2072102268:2072102268(0) ack 1 win 453 <nop,nop,TS val 117573699 ecr 5>"
        );
    }

    #[test]
    fn no_ack_and_no_options() {
        let rendered = render(&segment(TcpFlags::SYN | TcpFlags::ECE | TcpFlags::CWR, vec![], 0));
        assert_eq!(rendered, "SEW 2072102268:2072102268(0) win 453 ");
    }

    #[test]
    fn sequence_end_wraps() {
        let mut seg = segment(TcpFlags::PSH | TcpFlags::ACK, vec![], 10);
        seg.sequence = u32::MAX - 4;
        assert!(render(&seg).starts_with("P. 4294967291:5(10) "));
    }

    #[test]
    fn option_spellings() {
        let cases = [
            (TcpOption::EndOfList, "eol"),
            (TcpOption::Mss(1000), "mss 1000"),
            (TcpOption::WindowScale(7), "wscale 7"),
            (TcpOption::SackPermitted, "sackOK"),
            (TcpOption::Sack(vec![(1, 2), (3, 4)]), "sack 1:2 3:4"),
            (TcpOption::FastOpen(Vec::new()), "FO"),
            (TcpOption::FastOpen(vec![0xde, 0xad]), "FO dead"),
            (
                TcpOption::Unknown {
                    kind: 253,
                    length: 4,
                },
                "opt-253 len 4",
            ),
        ];
        for (option, expected) in cases {
            assert_eq!(option.to_string(), expected);
        }
    }
}
