//! Argument parsing and subcommands of the `charsniff` binary.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use charsniff::auto::decode_detected;
use charsniff::{
    CharsetConverter, CharsetDetector, Config, DEFAULT_MAX_RESULTS, Encoding, EncodingGuess,
    Error as CharsetError, ErrorMode, Family, SignatureTable,
};

/// Detect and convert character encodings
#[derive(Parser)]
#[command(name = "charsniff")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug details to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert input from one encoding to another
    Convert(ConvertArgs),

    /// Rank the likely encodings of the input
    Detect(DetectArgs),

    /// List the supported encodings
    List(ListArgs),

    /// Check that the input is valid in an encoding
    Validate(ValidateArgs),

    /// Show the details of one encoding
    Info(InfoArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Source encoding (detected when omitted)
    #[arg(short = 'f', long = "from")]
    from: Option<Encoding>,

    /// Target encoding
    #[arg(short = 't', long = "to")]
    to: Encoding,

    /// Read from this file instead of stdin
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Substitute instead of failing on bad input
    #[arg(long)]
    lossy: bool,

    /// Substitution character for lossy conversion
    #[arg(long)]
    replacement: Option<char>,

    /// Drop a leading byte order mark
    #[arg(long)]
    strip_bom: bool,

    /// Start the output with the target's byte order mark
    #[arg(long)]
    add_bom: bool,
}

#[derive(Args)]
struct DetectArgs {
    /// Read from this file instead of stdin
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum number of candidates to show
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Ignore HTML/XML tags
    #[arg(long)]
    strip_markup: bool,

    /// Bytes examined from the start of the input
    #[arg(long)]
    sample_size: Option<usize>,
}

#[derive(Args)]
struct ListArgs {
    /// Filter by family
    #[arg(long)]
    family: Option<FamilyArg>,

    /// Show only ASCII-compatible encodings
    #[arg(long)]
    ascii_compatible: bool,

    /// Show only detectable encodings
    #[arg(long)]
    detectable: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Read from this file instead of stdin
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Encoding the input should be valid in
    #[arg(short = 'e', long = "encoding")]
    encoding: Encoding,
}

#[derive(Args)]
struct InfoArgs {
    /// Encoding to describe
    encoding: Encoding,
}

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FamilyArg {
    Unicode,
    SingleByte,
    MultiByte,
}

impl From<FamilyArg> for Family {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Unicode => Family::Unicode,
            FamilyArg::SingleByte => Family::SingleByte,
            FamilyArg::MultiByte => Family::MultiByte,
        }
    }
}

#[derive(Serialize)]
struct ConversionReport {
    from: &'static str,
    to: &'static str,
    detected: Option<EncodingGuess>,
    bytes_read: usize,
    bytes_written: usize,
    elapsed_ms: u64,
}

#[derive(Serialize)]
struct DetectionReport {
    input_len: usize,
    guesses: Vec<EncodingGuess>,
}

#[derive(Serialize)]
struct ValidationReport {
    encoding: &'static str,
    valid: bool,
    error: Option<String>,
    position: Option<usize>,
}

#[derive(Serialize)]
struct EncodingInfo {
    name: &'static str,
    aliases: &'static [&'static str],
    family: Family,
    ascii_compatible: bool,
    multibyte: bool,
    detectable: bool,
    bom: Option<String>,
}

impl EncodingInfo {
    fn new(encoding: Encoding, table: &SignatureTable) -> Self {
        Self {
            name: encoding.name(),
            aliases: encoding.aliases(),
            family: encoding.family(),
            ascii_compatible: encoding.is_ascii_compatible(),
            multibyte: encoding.is_multibyte(),
            detectable: table.charsets().any(|e| e == encoding),
            bom: encoding.bom().map(|b| format!("{b:02X?}")),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Command::Convert(args) => convert(args, &cli),
        Command::Detect(args) => detect(args, &cli),
        Command::List(args) => list(args, &cli),
        Command::Validate(args) => validate(args, &cli),
        Command::Info(args) => info(args, &cli),
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose { "charsniff=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read from stdin")?;
            Ok(bytes)
        }
    }
}

fn convert(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let started = Instant::now();
    let config = load_config(cli)?;

    let mut converter_config = config.converter.clone();
    if args.lossy {
        converter_config.error_mode = ErrorMode::Lenient;
    }
    if let Some(replacement) = args.replacement {
        converter_config.substitution = replacement;
    }
    let mut converter = CharsetConverter::with_config(converter_config)?;

    let input = read_input(args.input.as_deref())?;

    let (from, detected, mut units) = match args.from {
        Some(from) => {
            let units = converter
                .decode_with(from, &input)
                .with_context(|| format!("Failed to decode input as {from}"))?;
            (from, None, units)
        }
        None => {
            let mut detector = CharsetDetector::with_config(config.detector.clone())?;
            let decoded = decode_detected(&mut detector, &mut converter, &input)?
                .context("Could not detect the input encoding; pass --from")?;
            let from = decoded
                .guess
                .encoding()
                .context("Detected an unregistered encoding")?;
            if cli.verbose {
                eprintln!("Detected {}", decoded.guess);
            }
            (from, Some(decoded.guess), decoded.units)
        }
    };

    if args.strip_bom && units.first() == Some(&0xFEFF) {
        units.remove(0);
    }

    let mut output = converter
        .encode_with(args.to, &units)
        .with_context(|| format!("Failed to encode output as {}", args.to))?;

    if args.add_bom {
        if let Some(bom) = args.to.bom() {
            if !output.starts_with(bom) {
                let mut with_bom = bom.to_vec();
                with_bom.extend_from_slice(&output);
                output = with_bom;
            }
        }
    }

    if let Some(path) = &args.output {
        fs::write(path, &output)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(&output)
            .context("Failed to write to stdout")?;
    }

    let elapsed = started.elapsed();
    if cli.verbose {
        eprintln!(
            "Converted {} bytes of {} to {} bytes of {} in {:?}",
            input.len(),
            from,
            output.len(),
            args.to,
            elapsed
        );
    }

    if let OutputFormat::Json = cli.format {
        let report = ConversionReport {
            from: from.name(),
            to: args.to.name(),
            detected,
            bytes_read: input.len(),
            bytes_written: output.len(),
            elapsed_ms: elapsed.as_millis() as u64,
        };
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn detect(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?.detector;
    if args.strip_markup {
        config.strip_markup = true;
    }
    if let Some(sample_size) = args.sample_size {
        config.max_sample_len = sample_size;
    }
    let mut detector = CharsetDetector::with_config(config)?;

    let data = read_input(args.input.as_deref())?;
    let guesses = detector.detect_all(&data, args.max_results)?;

    match cli.format {
        OutputFormat::Json => {
            let report = DetectionReport {
                input_len: data.len(),
                guesses,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if guesses.is_empty() {
                println!("No encoding detected");
            }
            for guess in &guesses {
                println!(
                    "{:>3}  {:<14} {}",
                    guess.confidence, guess.charset, guess.language
                );
            }
        }
    }

    Ok(())
}

fn list(args: &ListArgs, cli: &Cli) -> Result<()> {
    let table = SignatureTable::shared()?;
    let encodings: Vec<EncodingInfo> = Encoding::ALL
        .iter()
        .map(|&encoding| EncodingInfo::new(encoding, &table))
        .filter(|info| {
            if let Some(family) = args.family {
                if info.family != Family::from(family) {
                    return false;
                }
            }
            if args.ascii_compatible && !info.ascii_compatible {
                return false;
            }
            if args.detectable && !info.detectable {
                return false;
            }
            true
        })
        .collect();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&encodings)?),
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", encodings.len());
            println!();
            for info in &encodings {
                println!(
                    "{:15} {:13} {}",
                    info.name,
                    format!("[{}]", info.family.name()),
                    info.aliases.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn validate(args: &ValidateArgs, cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?.converter;
    config.error_mode = ErrorMode::Strict;
    let mut converter = CharsetConverter::with_config(config)?;

    let input = read_input(args.input.as_deref())?;

    let report = match converter.decode_with(args.encoding, &input) {
        Ok(_) => ValidationReport {
            encoding: args.encoding.name(),
            valid: true,
            error: None,
            position: None,
        },
        Err(e) if e.is_data_error() => ValidationReport {
            encoding: args.encoding.name(),
            valid: false,
            position: match &e {
                CharsetError::MalformedInput { position, .. } => Some(*position),
                _ => None,
            },
            error: Some(e.to_string()),
        },
        Err(e) => return Err(e.into()),
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            if report.valid {
                println!("✓ Input is valid {}", report.encoding);
            } else {
                println!("✗ Input is not valid {}", report.encoding);
                if let Some(position) = report.position {
                    println!("  First error at byte {position}");
                }
            }
        }
    }

    std::process::exit(if report.valid { 0 } else { 1 });
}

fn info(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let table = SignatureTable::shared()?;
    let info = EncodingInfo::new(args.encoding, &table);

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Text => {
            let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
            println!("Encoding Information: {}", info.name);
            println!("Aliases: {}", info.aliases.join(", "));
            println!("Family: {}", info.family.name());
            println!("ASCII Compatible: {}", yes_no(info.ascii_compatible));
            println!("Multibyte: {}", yes_no(info.multibyte));
            println!("Detectable: {}", yes_no(info.detectable));
            println!("BOM: {}", info.bom.as_deref().unwrap_or("None"));
        }
    }

    Ok(())
}
