//! CLI entry point for linkmeta.

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Read};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use linkmeta_core::input::parse_links;
use linkmeta_core::{HttpRedirectResolver, PipelineConfig, write_records};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = load_config(&args)?;
    debug!(?config, "configuration resolved");

    let Some(input_text) = read_input(&args)? else {
        info!("No input provided. Pass links as arguments, via --input, or on stdin.");
        info!("Example: echo 'https://bit.ly/abc' | linkmeta --warehouse sqlite:title_info.db");
        return Ok(());
    };

    let links = parse_links(&input_text);
    if links.is_empty() {
        info!("No links found in input");
        return Ok(());
    }

    let resolver = HttpRedirectResolver::new(config.resolve_timeout(), config.max_redirects)?;
    let progress = progress_bar(links.len(), args.quiet);

    let result = linkmeta_core::run(&links, &config, &resolver, &progress).await;
    progress.finish_and_clear();
    let output = result?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path.display()))?;
            write_records(&output.records, args.format, BufWriter::new(file))
                .with_context(|| format!("Failed to write results to '{}'", path.display()))?;
            info!(path = %path.display(), records = output.records.len(), "Results written");
        }
        None => write_records(&output.records, args.format, io::stdout().lock())
            .context("Failed to write results to stdout")?,
    }

    Ok(())
}

/// Loads file/env configuration and applies CLI overrides on top.
fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;

    if let Some(cache) = &args.cache {
        config.cache_path.clone_from(cache);
    }
    if let Some(warehouse) = &args.warehouse {
        config.warehouse_url = Some(warehouse.clone());
    }
    if let Some(timeout) = args.timeout {
        config.resolve_timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

/// Returns the raw link text from arguments, `--input`, or piped stdin.
fn read_input(args: &Args) -> Result<Option<String>> {
    if !args.links.is_empty() {
        return Ok(Some(args.links.join("\n")));
    }

    if let Some(path) = &args.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
        return Ok(Some(text));
    }

    if io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read links from stdin")?;
    Ok(Some(buffer))
}

fn progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} Resolving links [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
