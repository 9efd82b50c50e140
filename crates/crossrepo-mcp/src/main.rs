//! Crossrepo MCP Server
//!
//! Usage:
//!   crossrepo-mcp [--config repos.yaml] [--env-file .env]
//!
//! The server communicates over stdio using JSON-RPC 2.0.

use anyhow::Result;
use clap::Parser;
use crossrepo_core::{Paths, Registry};
use crossrepo_mcp::listing::format_listing;
use crossrepo_mcp::{App, McpServer};
use crossrepo_search::Ripgrep;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crossrepo-mcp")]
#[command(about = "MCP server for regex search across local repositories")]
#[command(version)]
struct Cli {
    /// Registry file (default: $CROSSREPO_CONFIG, ./repos.yaml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// .env file holding the repository paths (default: next to the registry file)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// ripgrep binary
    #[arg(long, env = "CROSSREPO_RG", default_value = "rg")]
    rg: PathBuf,

    /// Extra ripgrep argument, placed before the generated ones (repeatable)
    #[arg(long = "rg-arg", allow_hyphen_values = true)]
    rg_args: Vec<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the repository listing and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to stderr (stdout is for MCP protocol)
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry_file = Paths::new().registry_file(cli.config.as_deref());
    let registry = Registry::load(&registry_file, cli.env_file.as_deref())?;

    if cli.check {
        print!("{}", format_listing(&registry.repos));
        return Ok(());
    }

    let engine = Ripgrep::new(cli.rg).with_args(cli.rg_args);

    info!("Starting crossrepo MCP server (ripgrep: {})", engine.binary().display());

    let mut server = McpServer::new(App::new(registry, engine));
    server.run().await?;

    Ok(())
}
