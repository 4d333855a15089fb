use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const SCTP_ABORT_HEX: &str = "4500002400000000ff84b550020202020101010104d21f90010203043d99bfe306010004";

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pktdump"))
}

fn sctp_abort() -> Vec<u8> {
    (0..SCTP_ABORT_HEX.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&SCTP_ABORT_HEX[i..i + 2], 16).expect("hex"))
        .collect()
}

/// Little-endian legacy pcap with LINKTYPE_RAW frames.
fn write_capture(dir: &Path, name: &str, frames: &[&[u8]]) -> PathBuf {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&101u32.to_le_bytes());
    for frame in frames {
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    let path = dir.join(name);
    std::fs::write(&path, out).expect("write capture");
    path
}

#[test]
fn help_lists_examples() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Examples:").and(contains("pktdump hex \"$(cat packet.hex)\"")));
    cmd()
        .args(["pcap", "dump", "--help"])
        .assert()
        .success()
        .stdout(contains("pktdump pcap dump capture.pcapng --udp-payload sctp"));
}

#[test]
fn hex_prints_standard_line() {
    cmd()
        .arg("hex")
        .arg(SCTP_ABORT_HEX)
        .assert()
        .success()
        .stdout("2.2.2.2:1234 > 1.1.1.1:8080 sctp: ABORT[flgs=T]\n");
}

#[test]
fn hex_honours_frame_and_verbosity() {
    cmd()
        .args(["hex", "--frame", "ipv4", "--verbosity", "brief"])
        .arg("45 00 00 24 00 00 00 00 ff 84 b5 50 02 02 02 02 01 01 01 01 04 d2 1f 90 01 02 03 04 3d 99 bf e3 06 01 00 04")
        .assert()
        .success()
        .stdout("sctp: ABORT[flgs=T]\n");
}

#[test]
fn hex_reads_stdin() {
    cmd()
        .args(["hex", "-", "--verbosity", "verbose"])
        .write_stdin(format!("{SCTP_ABORT_HEX}\n"))
        .assert()
        .success()
        .stdout(contains("sctp: ABORT[flgs=T]\n0x0000: 45 00 00 24"));
}

#[test]
fn truncated_hex_shows_error_and_hint() {
    cmd()
        .arg("hex")
        .arg(&SCTP_ABORT_HEX[..24])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error: cannot decode packet").and(contains("hint:")));
}

#[test]
fn malformed_hex_is_rejected() {
    cmd()
        .args(["hex", "45zz"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid hex digit 'z'"));
}

#[test]
fn pcap_dump_prints_one_line_per_packet() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    let input = write_capture(temp.path(), "two.pcap", &[&frame, &frame[..12]]);

    let assert = cmd()
        .args(["pcap", "dump"])
        .arg(&input)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "1970-01-01T00:00:00Z 2.2.2.2:1234 > 1.1.1.1:8080 sctp: ABORT[flgs=T]"
    );
    assert!(lines[1].starts_with("1970-01-01T00:00:00Z error: "));
}

#[test]
fn pcap_dump_json_is_valid() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    let input = write_capture(temp.path(), "one.pcap", &[&frame]);

    let assert = cmd()
        .args(["pcap", "dump", "--json", "--verbosity", "brief"])
        .arg(&input)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let dump: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(dump["tool"]["name"], "pktdump");
    assert_eq!(dump["summary"]["packets_total"], 1);
    assert_eq!(dump["packets"][0]["summary"], "sctp: ABORT[flgs=T]");
}

#[test]
fn pcap_dump_reads_stdin() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    let input = write_capture(temp.path(), "stdin.pcap", &[&frame]);
    let bytes = std::fs::read(&input).expect("read capture");

    cmd()
        .args(["pcap", "dump", "-", "--verbosity", "brief"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(contains("sctp: ABORT[flgs=T]"));
}

#[test]
fn output_file_and_quiet() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    let input = write_capture(temp.path(), "out.pcap", &[&frame]);
    let output = temp.path().join("nested").join("dump.json");

    cmd()
        .args(["pcap", "dump", "--json", "--pretty"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("OK: dump written"));
    let written = std::fs::read_to_string(&output).expect("output written");
    let _: Value = serde_json::from_str(&written).expect("valid json");

    cmd()
        .args(["pcap", "dump", "--quiet"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn output_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    let input = write_capture(temp.path(), "same.pcap", &[&frame]);

    cmd()
        .args(["pcap", "dump"])
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("output path must differ from input"));
}

#[test]
fn strict_fails_when_packets_fail() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    let input = write_capture(temp.path(), "bad.pcap", &[&frame, &frame[..12]]);

    cmd()
        .args(["pcap", "dump", "--strict"])
        .arg(&input)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("1 packets failed to decode"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");

    cmd()
        .args(["pcap", "dump"])
        .arg(missing)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn glob_with_several_matches_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    write_capture(temp.path(), "a.pcap", &[&frame]);
    write_capture(temp.path(), "b.pcap", &[&frame]);

    cmd()
        .args(["pcap", "dump"])
        .arg(temp.path().join("*.pcap"))
        .assert()
        .failure()
        .stderr(contains("multiple files match pattern").and(contains("hint:")));
}

#[test]
fn glob_with_single_match_is_used() {
    let temp = TempDir::new().expect("tempdir");
    let frame = sctp_abort();
    write_capture(temp.path(), "only.pcap", &[&frame]);

    cmd()
        .args(["pcap", "dump", "--verbosity", "brief"])
        .arg(temp.path().join("*.pcap"))
        .assert()
        .success()
        .stdout(contains("sctp: ABORT[flgs=T]"));
}
