use std::fs::File;
use std::io::{BufReader, Chain, Cursor, Read};
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{
    Block, EnhancedPacketBlock, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError,
    PcapNGReader, SimplePacketBlock,
};
use tracing::{debug, trace};

use super::{PacketEvent, PacketSource, SourceError};

const READER_BUFFER_SIZE: usize = 64 * 1024;
const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
/// Legacy pcap magic announcing nanosecond timestamps, in either byte order.
const NANOSECOND_MAGIC: u32 = 0xa1b2_3c4d;

/// Stream with its sniffed magic bytes put back in front.
type Rewound<R> = Chain<Cursor<[u8; 4]>, R>;

/// Legacy pcap or pcapng reader over any byte stream.
///
/// The format is picked from the first four bytes, so the input does not
/// need to be seekable (standard input works).
pub struct PcapSource<R: Read> {
    inner: Format<Rewound<R>>,
}

/// Capture file on disk.
pub type PcapFileSource = PcapSource<BufReader<File>>;

enum Format<R: Read> {
    Legacy {
        reader: LegacyPcapReader<R>,
        linktype: Linktype,
        nanoseconds: bool,
    },
    Ng {
        reader: PcapNGReader<R>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        debug!(path = %path.display(), "opening capture file");
        PcapSource::from_reader(BufReader::new(file))
    }
}

impl<R: Read> PcapSource<R> {
    pub fn from_reader(mut input: R) -> Result<Self, SourceError> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        let rewound = Cursor::new(magic).chain(input);

        let inner = if magic == PCAPNG_MAGIC {
            let reader = PcapNGReader::new(READER_BUFFER_SIZE, rewound)
                .map_err(|e| SourceError::pcap("pcapng reader init", e))?;
            Format::Ng {
                reader,
                linktypes: Vec::new(),
            }
        } else {
            let reader = LegacyPcapReader::new(READER_BUFFER_SIZE, rewound)
                .map_err(|e| SourceError::pcap("pcap reader init", e))?;
            Format::Legacy {
                reader,
                linktype: Linktype::ETHERNET,
                nanoseconds: false,
            }
        };
        Ok(Self { inner })
    }
}

impl<R: Read> PacketSource for PcapSource<R> {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        loop {
            match &mut self.inner {
                Format::Legacy {
                    reader,
                    linktype,
                    nanoseconds,
                } => match reader.next() {
                    Ok((offset, block)) => {
                        let event = match block {
                            PcapBlockOwned::LegacyHeader(header) => {
                                *linktype = header.network;
                                *nanoseconds = header.magic_number == NANOSECOND_MAGIC;
                                trace!(linktype = header.network.0, "pcap header");
                                None
                            }
                            PcapBlockOwned::Legacy(packet) => {
                                let fraction = if *nanoseconds { 1e-9 } else { 1e-6 };
                                Some(PacketEvent {
                                    ts: Some(
                                        f64::from(packet.ts_sec)
                                            + f64::from(packet.ts_usec) * fraction,
                                    ),
                                    linktype: *linktype,
                                    data: packet.data.to_vec(),
                                    original_len: packet.origlen,
                                })
                            }
                            _ => None,
                        };
                        reader.consume(offset);
                        if event.is_some() {
                            return Ok(event);
                        }
                    }
                    Err(PcapError::Eof) => return Ok(None),
                    Err(PcapError::Incomplete(_)) => {
                        reader
                            .refill()
                            .map_err(|e| SourceError::pcap("pcap reader refill", e))?;
                    }
                    Err(e) => return Err(SourceError::pcap("pcap reader next", e)),
                },
                Format::Ng { reader, linktypes } => match reader.next() {
                    Ok((offset, block)) => {
                        let event = match block {
                            PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                                linktypes.clear();
                                None
                            }
                            PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                                trace!(linktype = intf.linktype.0, "pcapng interface");
                                linktypes.push(intf.linktype);
                                None
                            }
                            PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => {
                                Some(enhanced_packet(&packet, linktypes))
                            }
                            PcapBlockOwned::NG(Block::SimplePacket(packet)) => {
                                Some(simple_packet(&packet, linktypes))
                            }
                            _ => None,
                        };
                        reader.consume(offset);
                        if event.is_some() {
                            return Ok(event);
                        }
                    }
                    Err(PcapError::Eof) => return Ok(None),
                    Err(PcapError::Incomplete(_)) => {
                        reader
                            .refill()
                            .map_err(|e| SourceError::pcap("pcapng reader refill", e))?;
                    }
                    Err(e) => return Err(SourceError::pcap("pcapng reader next", e)),
                },
            }
        }
    }
}

/// Link type of a pcapng interface, Ethernet when no description was seen.
fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// Default pcapng resolution is microseconds.
fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = (u64::from(ts_high) << 32) | u64::from(ts_low);
    ts as f64 * 1e-6
}

fn enhanced_packet(packet: &EnhancedPacketBlock<'_>, linktypes: &[Linktype]) -> PacketEvent {
    let captured = packet.caplen as usize;
    PacketEvent {
        ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
        linktype: linktype_for_interface(linktypes, packet.if_id),
        data: packet.data[..captured.min(packet.data.len())].to_vec(),
        original_len: packet.origlen,
    }
}

fn simple_packet(packet: &SimplePacketBlock<'_>, linktypes: &[Linktype]) -> PacketEvent {
    PacketEvent {
        ts: None,
        linktype: linktype_for_interface(linktypes, 0),
        data: packet.data.to_vec(),
        original_len: packet.origlen,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pcap_parser::Linktype;

    use super::{PcapSource, linktype_for_interface, pcapng_ts_to_seconds};
    use crate::source::{PacketSource, SourceError};

    fn legacy_capture(magic: [u8; 4], linktype: u32, frames: &[(u32, u32, &[u8])]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&magic);
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&65535u32.to_le_bytes());
        bytes.extend_from_slice(&linktype.to_le_bytes());
        for (sec, frac, data) in frames {
            bytes.extend_from_slice(&sec.to_le_bytes());
            bytes.extend_from_slice(&frac.to_le_bytes());
            bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
            bytes.extend_from_slice(data);
        }
        bytes
    }

    #[test]
    fn legacy_capture_yields_frames_in_order() {
        let capture = legacy_capture(
            [0xd4, 0xc3, 0xb2, 0xa1],
            101,
            &[(1, 500_000, &[0x45, 0x00]), (2, 0, &[0x60])],
        );
        let mut source = PcapSource::from_reader(Cursor::new(capture)).unwrap();

        let first = source.next_packet().unwrap().unwrap();
        assert_eq!(first.linktype, Linktype::RAW);
        assert_eq!(first.data, vec![0x45, 0x00]);
        assert_eq!(first.original_len, 2);
        assert!((first.ts.unwrap() - 1.5).abs() < 1e-9);

        let second = source.next_packet().unwrap().unwrap();
        assert_eq!(second.data, vec![0x60]);
        assert!(source.next_packet().unwrap().is_none());
    }

    #[test]
    fn nanosecond_magic_scales_fraction() {
        let capture = legacy_capture([0x4d, 0x3c, 0xb2, 0xa1], 1, &[(3, 250_000_000, &[0u8; 14])]);
        let mut source = PcapSource::from_reader(Cursor::new(capture)).unwrap();
        let event = source.next_packet().unwrap().unwrap();
        assert_eq!(event.linktype, Linktype::ETHERNET);
        assert!((event.ts.unwrap() - 3.25).abs() < 1e-9);
    }

    #[test]
    fn short_input_is_io_error() {
        let err = PcapSource::from_reader(Cursor::new(vec![0x0a, 0x0d])).err().unwrap();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn linktype_defaults_to_ethernet_when_missing() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 1), Linktype::ETHERNET);
    }

    #[test]
    fn pcapng_ts_to_seconds_converts_microseconds() {
        let seconds = pcapng_ts_to_seconds(0, 1_500_000);
        assert!((seconds - 1.5).abs() < f64::EPSILON);
    }
}
