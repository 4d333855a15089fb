use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use pktdump_core::{
    CaptureDump, DumpOptions, FrameHint, InputInfo, LeafProtocol, Packet, ParseError,
    ParseErrorKind, PcapSource, Verbosity,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PKTDUMP_BUILD_COMMIT"),
    " ",
    env!("PKTDUMP_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  pktdump hex \"$(cat packet.hex)\" --frame ethernet\n  pktdump pcap dump capture.pcapng --udp-payload sctp\n  pktdump pcap dump 'captures/*.pcap' --json --pretty -o dump.json";

#[derive(Parser, Debug)]
#[command(name = "pktdump")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode raw IPv4/IPv6 packets (GRE, MPLS, TCP, UDP, UDP-Lite, SCTP) and print one line per packet.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log decoder activity to stderr (same as RUST_LOG=debug)
    #[arg(long, global = true)]
    verbose_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single packet given as hex text.
    Hex {
        /// Hex bytes (whitespace, ':' and '0x' prefixes allowed), or '-' to read stdin
        input: String,

        /// Outer framing of the bytes
        #[arg(long, value_enum, default_value_t = Frame::Raw)]
        frame: Frame,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Operations on PCAP/PCAPNG inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode every packet of a capture file.
    #[command(after_help = EXAMPLES)]
    Dump {
        /// Path to a .pcap or .pcapng file, a glob matching exactly one, or '-' for stdin
        input: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        /// Write the whole dump as JSON instead of text lines
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,

        /// Output path (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Exit with a non-zero code if any packet fails to decode
        #[arg(long)]
        strict: bool,

        /// Suppress non-error output on stderr
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct RenderArgs {
    /// Protocol carried inside UDP payloads
    #[arg(long, value_enum)]
    udp_payload: Option<Leaf>,

    /// Amount of detail per packet
    #[arg(long, value_enum, default_value_t = Detail::Standard)]
    verbosity: Detail,
}

impl RenderArgs {
    fn options(self) -> DumpOptions {
        DumpOptions {
            expected_leaf: self.udp_payload.map(LeafProtocol::from),
            verbosity: Verbosity::from(self.verbosity),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Ipv4,
    Ipv6,
    Ethernet,
    /// IP version taken from the first nibble
    Raw,
}

impl From<Frame> for FrameHint {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Ipv4 => FrameHint::Ipv4,
            Frame::Ipv6 => FrameHint::Ipv6,
            Frame::Ethernet => FrameHint::Ethernet,
            Frame::Raw => FrameHint::RawIp,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    Tcp,
    Sctp,
}

impl From<Leaf> for LeafProtocol {
    fn from(leaf: Leaf) -> Self {
        match leaf {
            Leaf::Tcp => LeafProtocol::Tcp,
            Leaf::Sctp => LeafProtocol::Sctp,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Detail {
    Brief,
    Standard,
    Verbose,
}

impl From<Detail> for Verbosity {
    fn from(detail: Detail) -> Self {
        match detail {
            Detail::Brief => Verbosity::Brief,
            Detail::Standard => Verbosity::Standard,
            Detail::Verbose => Verbosity::Verbose,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose_log);

    let result = match cli.command {
        Commands::Hex {
            input,
            frame,
            render,
        } => cmd_hex(&input, frame, render),
        Commands::Pcap { command } => match command {
            PcapCommands::Dump {
                input,
                render,
                json,
                pretty,
                output,
                strict,
                quiet,
            } => cmd_pcap_dump(
                &input,
                render,
                OutputArgs {
                    json,
                    pretty,
                    output,
                    strict,
                    quiet,
                },
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        let hint = match err.kind() {
            ParseErrorKind::Truncated => Some("the packet looks cut short; pass every byte".to_string()),
            ParseErrorKind::UnsupportedEncapsulation => {
                Some("check --frame and --udp-payload".to_string())
            }
            ParseErrorKind::LengthViolation => None,
        };
        CliError::new(format!("cannot decode packet: {err}"), hint)
    }
}

fn cmd_hex(input: &str, frame: Frame, render: RenderArgs) -> Result<(), CliError> {
    let text = if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read hex from stdin")?;
        text
    } else {
        input.to_string()
    };
    let bytes = decode_hex(&text)?;
    debug!(len = bytes.len(), ?frame, "decoding hex input");

    let options = render.options();
    let packet = Packet::parse(bytes, FrameHint::from(frame), options.expected_leaf)?;
    let line = packet
        .format(options.verbosity)
        .context("Failed to render packet")?;
    print_line(&line);
    Ok(())
}

/// Bytes from hex text; separators and `0x` prefixes are ignored.
fn decode_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();
    if digits.is_empty() {
        return Err(CliError::new(
            "no hex bytes given",
            Some("pass bytes like '45 00 00 24' or '450000'".to_string()),
        ));
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CliError::new(
            format!("invalid hex digit '{bad}'"),
            Some("only 0-9, a-f, whitespace, ':' and ',' are accepted".to_string()),
        ));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            format!("odd number of hex digits ({})", digits.len()),
            Some("every byte needs two digits".to_string()),
        ));
    }
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("hex text is not ASCII")?;
            u8::from_str_radix(pair, 16)
                .with_context(|| format!("invalid hex byte '{pair}'"))
                .map_err(CliError::from)
        })
        .collect()
}

#[derive(Debug)]
struct OutputArgs {
    json: bool,
    pretty: bool,
    output: Option<PathBuf>,
    strict: bool,
    quiet: bool,
}

fn cmd_pcap_dump(input: &Path, render: RenderArgs, out: OutputArgs) -> Result<(), CliError> {
    let options = render.options();
    let dump = if input.as_os_str() == "-" {
        let source = PcapSource::from_reader(io::stdin().lock())
            .context("Failed to read capture from stdin")?;
        let info = InputInfo {
            path: "-".to_string(),
            bytes: None,
        };
        pktdump_core::dump_source(info, source, &options).context("PCAP/PCAPNG decoding failed")?
    } else {
        let resolved_input = resolve_input_path(input)?;
        validate_input_file(&resolved_input)?;
        if let Some(output) = out.output.as_ref() {
            ensure_distinct_paths(&resolved_input, output)?;
        }
        pktdump_core::dump_capture_file(&resolved_input, &options)
            .context("PCAP/PCAPNG decoding failed")?
    };

    let rendered = if out.json {
        serialize_dump(&dump, out.pretty)?
    } else {
        render_lines(&dump)
    };

    match out.output.as_ref() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            if !out.quiet {
                eprintln!("OK: dump written -> {}", path.display());
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    let failed = dump.summary.packets_failed;
    if failed > 0 && !out.quiet {
        eprintln!(
            "{failed} of {} packets could not be decoded",
            dump.summary.packets_total
        );
    }
    if out.strict && failed > 0 {
        return Err(CliError::new(
            format!("{failed} packets failed to decode"),
            Some("run without --strict to see the per-packet errors".to_string()),
        ));
    }
    Ok(())
}

/// One line per packet: `[timestamp ]summary` or `[timestamp ]error: message`.
fn render_lines(dump: &CaptureDump) -> String {
    let mut text = String::new();
    for record in &dump.packets {
        if let Some(timestamp) = &record.timestamp {
            text.push_str(timestamp);
            text.push(' ');
        }
        match (&record.summary, &record.error) {
            (Some(summary), _) => text.push_str(summary),
            (None, Some(error)) => {
                text.push_str("error: ");
                text.push_str(&error.message);
            }
            (None, None) => {}
        }
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    text
}

fn serialize_dump(dump: &CaptureDump, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(dump)
    } else {
        serde_json::to_string(dump)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn print_line(line: &str) {
    if line.ends_with('\n') {
        print!("{line}");
    } else {
        println!("{line}");
    }
}

fn ensure_distinct_paths(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Ok(output_dir) = fs::canonicalize(output_dir) else {
        // Directory does not exist yet, so it cannot hold the input.
        return Ok(());
    };
    let Some(name) = output.file_name() else {
        return Err(CliError::new(
            format!("invalid output path: {}", output.display()),
            Some("pass a file name to -o/--output".to_string()),
        ));
    };
    if output_dir.join(name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::{decode_hex, is_glob_pattern};

    #[test]
    fn hex_accepts_common_separators() {
        assert_eq!(decode_hex("45 00:0x24,ff").unwrap(), vec![0x45, 0x00, 0x24, 0xff]);
        assert_eq!(decode_hex("4500\n0024").unwrap(), vec![0x45, 0x00, 0x00, 0x24]);
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert!(decode_hex("").is_err());
        assert!(decode_hex("450").unwrap_err().message.contains("odd number"));
        assert!(decode_hex("zz").unwrap_err().message.contains("invalid hex digit"));
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("captures/*.pcap"));
        assert!(!is_glob_pattern("capture.pcap"));
    }
}
