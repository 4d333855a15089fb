use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Exposes PKTDUMP_BUILD_COMMIT and PKTDUMP_BUILD_DATE to the binary for
/// `--version` output.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKTDUMP_COMMIT");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit = env::var("PKTDUMP_COMMIT")
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| git(&["rev-parse", "HEAD"]))
        .map(|full| full.chars().take(7).collect::<String>())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let build_date = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .filter(|value| !value.is_empty())
        .map(|epoch| format!("@{epoch}"))
        .or_else(|| git(&["log", "-1", "--format=%cs"]))
        .unwrap_or_else(|| UNKNOWN.to_string());

    emit("PKTDUMP_BUILD_COMMIT", &commit);
    emit("PKTDUMP_BUILD_DATE", &build_date);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
