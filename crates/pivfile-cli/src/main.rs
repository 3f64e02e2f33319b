use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use log::LevelFilter;
use serde::Serialize;

const SUPPORTED_EXTENSIONS: [&str; 5] = ["im7", "vc7", "imx", "img", "vec"];
const SUPPORTED_HINT: &str = "expected a .im7, .vc7, .imx, .img or .vec file";

#[derive(Parser, Debug)]
#[command(name = "pivfile")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("PIVFILE_BUILD_COMMIT"),
    ", ",
    env!("PIVFILE_BUILD_DATE"),
    ")"
))]
#[command(
    about = "Decoder for LaVision DaVis PIV files (IM7 / VC7 / IMX).",
    long_about = None,
    after_help = "Examples:\n  pivfile inspect B00001.vc7 --stdout --pretty\n  pivfile export B00001.vc7 -o field.json --mask-disabled\n  pivfile inspect 'run1/B0000?.vc7' -o summary.json"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a file and write a JSON summary of its header, scales and field.
    #[command(alias = "info")]
    Inspect {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Decode a vector file and write the field as a PIVMAT-style JSON document.
    Export {
        #[command(flatten)]
        output: OutputArgs,

        /// Write vectors with selector 0 as null
        #[arg(long)]
        mask_disabled: bool,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Path to a DaVis file (glob patterns must match exactly one file)
    input: PathBuf,

    /// Output path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Inspect { output } => cmd_inspect(output, cli.quiet),
        Commands::Export {
            output,
            mask_disabled,
        } => cmd_export(output, mask_disabled, cli.quiet),
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

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();
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
        // Keep the decoder's cause visible after the context line.
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<pivfile_core::PivError> for CliError {
    fn from(err: pivfile_core::PivError) -> Self {
        use pivfile_core::PivError;
        let hint = match &err {
            PivError::FileOpen(_) => Some("check the path and file permissions".to_string()),
            PivError::Header(_) | PivError::Format(_) => Some(SUPPORTED_HINT.to_string()),
            PivError::Data(_) => Some("the file looks truncated or corrupt".to_string()),
            _ => None,
        };
        CliError::new(format!("decoding failed: {err}"), hint)
    }
}

fn cmd_inspect(args: OutputArgs, quiet: bool) -> Result<(), CliError> {
    let input = prepare_input(&args)?;
    let summary = pivfile_core::inspect_file(&input)?;
    let json = serialize_json(&summary, args.pretty, args.compact)?;
    emit(&args, &json, quiet)
}

fn cmd_export(args: OutputArgs, mask_disabled: bool, quiet: bool) -> Result<(), CliError> {
    let input = prepare_input(&args)?;
    let (mut buffer, _attributes) = pivfile_core::read(&input)?;
    if !buffer.buffer_format()?.is_vector() {
        return Err(CliError::new(
            format!("{} does not hold a vector field", input.display()),
            Some("use `pivfile inspect` for image files".to_string()),
        ));
    }
    let field = pivfile_core::pivmat_field(&mut buffer, mask_disabled)?;
    buffer.release()?;
    let json = serialize_json(&field, args.pretty, args.compact)?;
    emit(&args, &json, quiet)
}

/// Resolve the input, validate it, and make sure the output will not
/// overwrite it.
fn prepare_input(args: &OutputArgs) -> Result<PathBuf, CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    if !args.stdout {
        let report = args.report.as_ref().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        if output_target(report)?.as_deref() == Some(input_abs.as_path()) {
            return Err(CliError::new(
                format!("report path must differ from input: {}", report.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", args.input.display()),
            Some(SUPPORTED_HINT.to_string()),
        ));
    }
    Ok(resolved_input)
}

/// Absolute path the report would be written to, if its directory exists.
fn output_target(report: &Path) -> Result<Option<PathBuf>, CliError> {
    let parent = match report.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Ok(None),
    };
    let Ok(dir) = fs::canonicalize(parent) else {
        return Ok(None);
    };
    let name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report.display()))?;
    Ok(Some(dir.join(name)))
}

fn emit(args: &OutputArgs, json: &str, quiet: bool) -> Result<(), CliError> {
    let Some(report) = args.report.as_ref().filter(|_| !args.stdout) else {
        print!("{}", json);
        return Ok(());
    };

    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(SUPPORTED_HINT.to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some(SUPPORTED_HINT.to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
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

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some(format!("check the path or quote the pattern; {SUPPORTED_HINT}")),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
