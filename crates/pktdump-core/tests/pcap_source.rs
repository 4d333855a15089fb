use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use pktdump_core::{
    DumpOptions, PacketSource, PcapFileSource, SourceError, Verbosity, dump_capture_file,
};

const LINKTYPE_RAW: u32 = 101;

const SCTP_ABORT: [u8; 36] = [
    0x45, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x00, 0xff, 0x84, 0xb5, 0x50, 0x02, 0x02, 0x02,
    0x02, 0x01, 0x01, 0x01, 0x01, 0x04, 0xd2, 0x1f, 0x90, 0x01, 0x02, 0x03, 0x04, 0x3d, 0x99,
    0xbf, 0xe3, 0x06, 0x01, 0x00, 0x04,
];

fn temp_capture(name: &str, bytes: &[u8]) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("pktdump_{name}_{unique}"));
    fs::write(&path, bytes).unwrap();
    path
}

fn legacy_pcap(linktype: u32, frames: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&linktype.to_le_bytes());
    for (index, frame) in frames.iter().enumerate() {
        out.extend_from_slice(&(index as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    out
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let padded = body.len().div_ceil(4) * 4;
    let total = (12 + padded) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(&block_type.to_le_bytes());
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(body);
    out.resize(8 + padded, 0);
    out.extend_from_slice(&total.to_le_bytes());
    out
}

fn pcapng(linktype: u16, ts_micros: u64, frame: &[u8]) -> Vec<u8> {
    let mut section = Vec::new();
    section.extend_from_slice(&0x1a2b_3c4du32.to_le_bytes());
    section.extend_from_slice(&1u16.to_le_bytes());
    section.extend_from_slice(&0u16.to_le_bytes());
    section.extend_from_slice(&(-1i64).to_le_bytes());

    let mut interface = Vec::new();
    interface.extend_from_slice(&linktype.to_le_bytes());
    interface.extend_from_slice(&0u16.to_le_bytes());
    interface.extend_from_slice(&65535u32.to_le_bytes());

    let mut packet = Vec::new();
    packet.extend_from_slice(&0u32.to_le_bytes());
    packet.extend_from_slice(&((ts_micros >> 32) as u32).to_le_bytes());
    packet.extend_from_slice(&(ts_micros as u32).to_le_bytes());
    packet.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    packet.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    packet.extend_from_slice(frame);

    let mut out = pcapng_block(0x0a0d_0d0a, &section);
    out.extend(pcapng_block(0x0000_0001, &interface));
    out.extend(pcapng_block(0x0000_0006, &packet));
    out
}

#[test]
fn pcap_source_reads_legacy_capture() {
    let path = temp_capture(
        "legacy.pcap",
        &legacy_pcap(LINKTYPE_RAW, &[&SCTP_ABORT, &SCTP_ABORT[..12]]),
    );
    let mut source = PcapFileSource::open(&path).unwrap();

    let mut lengths = Vec::new();
    while let Some(event) = source.next_packet().unwrap() {
        lengths.push(event.data.len());
    }
    let _ = fs::remove_file(&path);

    assert_eq!(lengths, vec![36, 12]);
}

#[test]
fn dump_records_each_packet_in_order() {
    let path = temp_capture(
        "dump.pcap",
        &legacy_pcap(LINKTYPE_RAW, &[&SCTP_ABORT, &SCTP_ABORT[..12]]),
    );
    let options = DumpOptions {
        expected_leaf: None,
        verbosity: Verbosity::Brief,
    };
    let dump = dump_capture_file(&path, &options).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(dump.summary.packets_total, 2);
    assert_eq!(dump.summary.packets_failed, 1);
    assert_eq!(dump.input.bytes, Some(24 + 2 * 16 + 36 + 12));
    assert_eq!(dump.packets[0].summary.as_deref(), Some("sctp: ABORT[flgs=T]"));
    assert_eq!(
        dump.packets[1].timestamp.as_deref(),
        Some("1970-01-01T00:00:01Z")
    );
    let error = dump.packets[1].error.as_ref().unwrap();
    assert_eq!(error.kind, "truncated");
}

#[test]
fn dump_reads_pcapng_interfaces() {
    let path = temp_capture("dump.pcapng", &pcapng(LINKTYPE_RAW as u16, 1_500_000, &SCTP_ABORT));
    let dump = dump_capture_file(&path, &DumpOptions::default()).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(dump.packets.len(), 1);
    let record = &dump.packets[0];
    assert_eq!(record.linktype, LINKTYPE_RAW as i32);
    assert_eq!(record.timestamp.as_deref(), Some("1970-01-01T00:00:01.5Z"));
    assert_eq!(
        record.summary.as_deref(),
        Some("2.2.2.2:1234 > 1.1.1.1:8080 sctp: ABORT[flgs=T]")
    );
}

#[test]
fn pcap_source_rejects_truncated_file() {
    let path = temp_capture("truncated.pcapng", &[0x0a, 0x0d, 0x0d]);
    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    let _ = fs::remove_file(&path);

    assert!(matches!(err, SourceError::Io(_)));
}
