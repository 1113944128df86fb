//! mdsurface CLI - markdown rendering front end.
//!
//! Renders a markdown file, stdin, or a remote address to HTML through a
//! [`MarkdownSurface`], so the output matches what an embedding host would
//! display: same option handling, same sanitization policy for remote
//! content, same fallback behavior on fetch failure.

mod config;
mod error;
mod output;
mod watch;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mdsurface_core::{HttpClient, MarkdownSurface, OutputNode, SourceChild, SurfaceHost};
use tracing_subscriber::EnvFilter;

use config::{CliSettings, Config};
use error::CliError;
use output::Output;

/// Extra wait on top of the fetch timeout before giving up on an outcome.
const FETCH_GRACE: Duration = Duration::from_secs(5);

/// Render markdown to HTML.
#[derive(Parser)]
#[command(name = "mdsurface", version, about)]
struct Cli {
    /// Markdown file to render ("-" reads stdin).
    input: Option<PathBuf>,

    /// Fetch markdown from a remote address instead of a file.
    #[arg(long, conflicts_with = "input")]
    src: Option<String>,

    /// Render soft line breaks as hard breaks.
    #[arg(long)]
    breaks: bool,

    /// Plain CommonMark only (no tables, strikethrough or task lists).
    #[arg(long)]
    pedantic: bool,

    /// Smart typographic punctuation.
    #[arg(long)]
    smartypants: bool,

    /// Sanitize the output.
    #[arg(long)]
    sanitize: bool,

    /// Let fetched markdown render unsanitized.
    #[arg(long)]
    no_remote_sanitization: bool,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Re-render whenever the input file changes.
    #[arg(long, requires = "input")]
    watch: bool,

    /// Config file (otherwise mdsurface.toml is searched upward).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let ui = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(&cli, &ui) {
        ui.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli, ui: &Output) -> Result<(), CliError> {
    let settings = CliSettings {
        breaks: cli.breaks,
        pedantic: cli.pedantic,
        smartypants: cli.smartypants,
        sanitize: cli.sanitize,
        disable_remote_sanitization: cli.no_remote_sanitization,
    };
    let cfg = Config::load(cli.config.as_deref(), &settings)?;
    if let Some(path) = &cfg.config_path {
        tracing::info!(path = %path.display(), "loaded configuration");
    }

    let node = OutputNode::new();
    let mut surface =
        MarkdownSurface::with_client(Arc::new(HttpClient::with_timeout(cfg.fetch.timeout())));
    surface.set_breaks(cfg.render.breaks);
    surface.set_pedantic(cfg.render.pedantic);
    surface.set_smartypants(cfg.render.smartypants);
    surface.set_sanitize(cfg.render.sanitize);
    surface.set_disable_remote_sanitization(cfg.fetch.disable_remote_sanitization);

    if let Some(src) = &cli.src {
        surface.connect(&SurfaceHost {
            children: vec![SourceChild::remote(src)],
            output_slot: Some(node.clone()),
        });
        if surface.wait_remote(cfg.fetch.timeout() + FETCH_GRACE) == 0 {
            return Err(CliError::Fetch(format!(
                "timed out waiting for {src}"
            )));
        }
    } else {
        let text = read_input(cli.input.as_deref())?;
        surface.connect(&SurfaceHost {
            children: Vec::new(),
            output_slot: Some(node.clone()),
        });
        surface.set_markdown(Some(text));
    }

    write_rendered(cli.out.as_deref(), &node.html())?;

    if cli.watch {
        let path = cli
            .input
            .as_deref()
            .filter(|p| p.as_os_str() != "-")
            .ok_or_else(|| CliError::Validation("--watch needs a file, not stdin".to_owned()))?;
        watch::watch_and_render(path, &mut surface, &node, cli.out.as_deref(), ui)?;
    }

    Ok(())
}

/// Read markdown from a file or stdin.
fn read_input(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        None => Err(CliError::Validation(
            "provide a markdown file or --src URL".to_owned(),
        )),
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

/// Write rendered HTML to a file or stdout.
pub(crate) fn write_rendered(out: Option<&Path>, html: &str) -> Result<(), CliError> {
    match out {
        Some(path) => std::fs::write(path, html)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
