//! `toon-mcp-server`: serve the TOON conversion tools over stdio.
//!
//! Logs go to stderr; stdout carries only JSON-RPC responses.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use toon_mcp::{McpServer, ToolConfig, ToolRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Default indentation for convert_json_to_toon when a call omits it
    #[arg(long)]
    indent: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        indent = ?args.indent,
        "starting toon-mcp-server"
    );

    let registry = ToolRegistry::new(ToolConfig {
        default_indent: args.indent,
    });
    McpServer::new(registry).run_stdio().await?;
    Ok(())
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("toon_mcp={level},toon_mcp_server={level},toon_codec={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
