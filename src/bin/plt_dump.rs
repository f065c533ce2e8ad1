//! PLT Dump
//!
//! Parses an HPGL plotter file and prints the decoded commands.
//! Reads from a file or stdin and writes text or JSON to a file or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use plt_parser::app::{Config, Dump, OutputFormat};

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments
#[derive(Default)]
struct Args {
    /// Input file (stdin if not specified)
    input: Option<PathBuf>,
    /// Output file (stdout if not specified)
    output: Option<PathBuf>,
    /// Config file (~/.config/plt-parser/config.json if not specified)
    config: Option<PathBuf>,
    /// Log at info level instead of warn
    debug: bool,
    /// Force JSON output
    json: bool,
    /// Override the read buffer size
    buffer_size: Option<usize>,
    /// Show help
    help: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                args.help = true;
            }
            "-i" | "--input" => {
                i += 1;
                if i < argv.len() {
                    args.input = Some(PathBuf::from(&argv[i]));
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < argv.len() {
                    args.output = Some(PathBuf::from(&argv[i]));
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < argv.len() {
                    args.config = Some(PathBuf::from(&argv[i]));
                }
            }
            "-b" | "--buffer-size" => {
                i += 1;
                if i < argv.len() {
                    args.buffer_size = argv[i].parse().ok();
                }
            }
            "-d" | "--debug" => {
                args.debug = true;
            }
            "-j" | "--json" => {
                args.json = true;
            }
            other => {
                // Treat as input file if no flag
                if args.input.is_none() && !other.starts_with('-') {
                    args.input = Some(PathBuf::from(other));
                }
            }
        }
        i += 1;
    }

    args
}

fn print_help() {
    eprintln!(
        r#"plt-dump - Decode HPGL plotter files

USAGE:
    plt-dump [OPTIONS] [INPUT_FILE]

OPTIONS:
    -h, --help               Show this help message
    -i, --input <FILE>       Input file (stdin if not specified)
    -o, --output <FILE>      Output file (stdout if not specified)
    -c, --config <FILE>      Config file (default: ~/.config/plt-parser/config.json)
    -b, --buffer-size <N>    Read buffer size in bytes (default: 1024)
    -j, --json               Output commands, warnings and counters as JSON
    -d, --debug              Log at info level

EXAMPLES:
    plt-dump drawing.plt
    plt-dump -j -i drawing.plt -o drawing.json
    cat drawing.plt | plt-dump -d
"#
    );
}

fn main() -> ExitCode {
    let args = parse_args();

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    // Initialize logging
    let default_level = if args.debug { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load_or_default(),
    };
    if let Some(size) = args.buffer_size {
        config.parser.buffer_size = size;
    }
    if args.json {
        config.output.format = OutputFormat::Json;
    }

    info!(
        "input: {}, output: {}",
        display_path(args.input.as_ref(), "<stdin>"),
        display_path(args.output.as_ref(), "<stdout>")
    );

    let dump = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => Dump::from_reader(file, &config.parser),
            Err(e) => {
                error!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Dump::from_reader(io::stdin().lock(), &config.parser),
    };
    let dump = match dump {
        Ok(dump) => dump,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = match dump.render(config.output.format) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!("Error serializing commands: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(args.output.as_ref(), &rendered) {
        error!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn display_path(path: Option<&PathBuf>, fallback: &str) -> String {
    path.map_or_else(|| fallback.to_string(), |p| p.display().to_string())
}

fn write_output(path: Option<&PathBuf>, rendered: &str) -> io::Result<()> {
    match path {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            file.write_all(rendered.as_bytes())?;
            file.flush()
        }
        None => io::stdout().lock().write_all(rendered.as_bytes()),
    }
}
