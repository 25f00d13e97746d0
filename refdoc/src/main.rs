//! refdoc: generate reference documentation for a fluent builder API.
//!
//! Reads a structural description of the API (`--surface`, JSON), parses the
//! Java sources found under the given source roots for doc comments, and
//! writes one page per step and per registered plugin:
//!
//! `refdoc --surface api.json -o docs/reference 'modules/*/src/main/java'`

mod config;
mod loader;
mod parser;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::Config;
use refdoc_graph::{reference, TypeName};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "refdoc",
    about = "Generate reference documentation for a fluent builder API"
)]
struct Cli {
    /// Source roots to search for Java files (glob patterns supported).
    /// Earlier roots win when several contain the same file.
    sources: Vec<String>,

    /// Structural description of the API (JSON)
    #[arg(long)]
    surface: PathBuf,

    /// Output directory
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Config file (default: ./refdoc.toml when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output format: markdown (default), json
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Product name used in the index heading
    #[arg(long)]
    title: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    run(&cli)
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "refdoc=info,refdoc_graph=info",
        1 => "refdoc=debug,refdoc_graph=debug",
        _ => "refdoc=trace,refdoc_graph=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let title = resolve(cli.title.as_deref(), config.title.as_deref(), config::DEFAULT_TITLE);
    let format = resolve(cli.format.as_deref(), config.format.as_deref(), config::DEFAULT_FORMAT);
    let renderer = render::create_renderer(format)?;

    let surface = loader::load_surface(&cli.surface)?;
    let dirs = loader::expand_dirs(&cli.sources)?;
    let vocabulary = &config.vocabulary;
    let entry_points: Vec<&TypeName> = vocabulary
        .step_catalog
        .iter()
        .chain(&vocabulary.step_factory)
        .chain(vocabulary.index.iter().map(|i| &i.factory))
        .collect();
    let sources = loader::load_sources(
        surface.referenced_types().into_iter().chain(entry_points),
        &dirs,
    );

    let reference = reference::build(&surface, &sources, vocabulary, title)?;
    let pages = renderer.render(&reference)?;
    write_pages(&cli.output, &pages)?;
    info!(pages = pages.len(), output = %cli.output.display(), "reference written");
    Ok(())
}

/// First of: command line, config file, built-in default.
fn resolve<'a>(cli: Option<&'a str>, config: Option<&'a str>, default: &'a str) -> &'a str {
    cli.or(config).unwrap_or(default)
}

fn write_pages(output_dir: &Path, pages: &[render::Page]) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;
    for page in pages {
        let path = output_dir.join(&page.file_name);
        fs::write(&path, &page.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
