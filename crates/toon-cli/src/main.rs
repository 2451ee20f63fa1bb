//! `toon` CLI: encode, decode, and measure TOON documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to TOON (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | toon encode
//!
//! # Encode from file to file, 4-space indentation, pipe-delimited rows
//! toon encode -i data.json -o data.toon --indent 4 --delimiter pipe
//!
//! # Decode TOON back to pretty-printed JSON (or --compact)
//! toon decode -i data.toon
//!
//! # Wrap a system prompt in the TOON envelope, and unwrap it again
//! toon prompt encode -i prompt.txt | toon prompt decode
//!
//! # Show size statistics
//! toon stats -i data.json
//! ```
//!
//! Logs go to stderr. `--verbose` enables debug output; `RUST_LOG` overrides it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use toon_codec::{Delimiter, EncodeOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "toon",
    version,
    about = "TOON (Token-Oriented Object Notation) CLI",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log codec activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to TOON format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Spaces per nesting level (default 2; 0 is treated as 1)
        #[arg(long)]
        indent: Option<usize>,
        /// Separator for inline arrays and tabular rows: comma, tab or pipe
        #[arg(long, default_value = "comma")]
        delimiter: Delimiter,
    },
    /// Decode TOON back to JSON format
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Wrap or unwrap a system prompt in the `system_prompt` envelope
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },
    /// Show encoding statistics (byte counts, size reduction)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Subcommand)]
enum PromptAction {
    /// Prompt text → TOON envelope
    Encode {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// TOON envelope → prompt text
    Decode {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            output,
            indent,
            delimiter,
        } => {
            let json = read_input(input.as_deref())?;
            let options = EncodeOptions {
                indent,
                delimiter,
            };
            let toon = toon_codec::json_to_toon(&json, &options)
                .context("Failed to encode JSON to TOON")?;
            tracing::debug!(json_bytes = json.len(), toon_bytes = toon.len(), "encoded");
            write_output(output.as_deref(), &toon)?;
        }
        Commands::Decode {
            input,
            output,
            compact,
        } => {
            let toon = read_input(input.as_deref())?;
            let value = toon_codec::decode(&toon).context("Failed to decode TOON to JSON")?;
            let json = if compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            write_output(output.as_deref(), &json)?;
        }
        Commands::Prompt { action } => match action {
            PromptAction::Encode { input, output } => {
                let text = read_input(input.as_deref())?;
                let toon = toon_codec::encode_prompt(strip_final_newline(&text));
                write_output(output.as_deref(), &toon)?;
            }
            PromptAction::Decode { input, output } => {
                let toon = read_input(input.as_deref())?;
                let text = toon_codec::decode_prompt(&toon)
                    .context("Failed to decode system prompt envelope")?;
                write_output(output.as_deref(), &text)?;
            }
        },
        Commands::Stats { input } => {
            let json = read_input(input.as_deref())?;
            let value: toon_codec::ToonValue =
                serde_json::from_str(&json).context("Failed to parse JSON input")?;
            let compact = serde_json::to_string(&value)?;
            let toon = toon_codec::encode(&value, &EncodeOptions::default());
            let json_bytes = json.len();
            let toon_bytes = toon.len();
            println!("JSON size:  {} bytes", json_bytes);
            println!("Compact:    {} bytes", compact.len());
            println!("TOON size:  {} bytes", toon_bytes);
            println!("Reduction:  {:.1}%", reduction(json_bytes, toon_bytes));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("toon={level},toon_codec={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Percentage saved going from `before` to `after` bytes.
fn reduction(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        (1.0 - (after as f64 / before as f64)) * 100.0
    }
}

/// Drop the newline that `echo` and most editors append to a text file.
fn strip_final_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", content).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
