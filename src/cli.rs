//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use linkmeta_core::OutputFormat;

/// Resolve short links and join their ISBN/ASIN identifiers against title metadata.
///
/// Links are read from positional arguments, from --input, or from stdin
/// (one per line; blank lines and # comments are ignored).
#[derive(Parser, Debug)]
#[command(name = "linkmeta")]
#[command(author, version, about)]
pub struct Args {
    /// Links to resolve
    pub links: Vec<String>,

    /// Read links from a file instead of arguments/stdin
    #[arg(short, long, value_name = "FILE", conflicts_with = "links")]
    pub input: Option<PathBuf>,

    /// Config file (defaults to $XDG_CONFIG_HOME/linkmeta/config.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Link cache file
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Warehouse connection URL (e.g. sqlite:title_info.db)
    #[arg(short, long, value_name = "URL")]
    pub warehouse: Option<String>,

    /// Per-link resolve timeout in seconds (1-3600)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write results to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
