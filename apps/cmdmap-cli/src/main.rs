//! # cmdmap
//!
//! Command-line transport for the cmdmap dispatcher.
//!
//! Builds a request from flags, runs one pass against the built-in demo
//! catalog and prints the result pool.
//!
//! ## Usage
//!
//! ```text
//! cmdmap --cmd 'math\calc,text\case' \
//!        --map 'math\calc\sum\total:total' \
//!        -p numbers='[1,2,3]' -p text=hello
//! ```

mod demo;
mod params;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cmdmap_core::{DispatchConfig, Dispatcher, Format, PassOutcome, RawRequest};

/// Run one cmdmap pass from the command line.
#[derive(Parser)]
#[command(name = "cmdmap", version, about = "Directive-driven method dispatcher")]
struct Cli {
    /// Libraries and bare methods to call (comma-separated).
    #[arg(long)]
    cmd: String,

    /// Result routing rules (comma-separated `library\method\key:target`).
    #[arg(long)]
    map: Option<String>,

    /// Output format: json or raw.
    #[arg(long)]
    format: Option<String>,

    /// Body parameter as key=value (value parsed as JSON when possible).
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Query parameter as key=value (ignored with --body-only).
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    /// File parameter as key=path.
    #[arg(long = "file", value_name = "KEY=PATH")]
    files: Vec<String>,

    /// Config file (defaults to ./cmdmap.toml when present).
    #[arg(long, default_value = "cmdmap.toml")]
    config: PathBuf,

    /// Run without safe-zone contract checks.
    #[arg(long)]
    no_safe_zone: bool,

    /// Only body parameters count as input.
    #[arg(long)]
    body_only: bool,

    /// Print the pass trace to stderr.
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so they don't mix with the rendered results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("cmdmap_core=info".parse()?)
                .add_directive("cmdmap=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Panics inside library methods are caught and stored as results. Report
    // them through the log instead of the default "thread panicked" message.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("{}", info);
    }));

    let cli = Cli::parse();

    let config = effective_config(&cli)?;
    tracing::debug!("config: {:?}", config);

    let request = build_request(&cli)?;
    let dispatcher = Dispatcher::new(config, demo::catalog()?);
    let outcome = dispatcher.handle(request);

    if cli.trace {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.trace)?);
    }
    print!("{}", render(&outcome)?);
    Ok(())
}

/// Config file (or defaults) with the command-line switches applied on top.
fn effective_config(cli: &Cli) -> Result<DispatchConfig> {
    let mut config = DispatchConfig::load_or_default(&cli.config)?;
    if cli.no_safe_zone {
        config.safe_zone = false;
    }
    if cli.body_only {
        config.accept_query = false;
    }
    Ok(config)
}

fn build_request(cli: &Cli) -> Result<RawRequest> {
    let mut request = RawRequest::new().with_body("cmd", Value::String(cli.cmd.clone()));
    if let Some(map) = &cli.map {
        request = request.with_body("map", Value::String(map.clone()));
    }
    if let Some(format) = &cli.format {
        if Format::parse(format).is_none() {
            anyhow::bail!("unknown format '{}': expected json or raw", format);
        }
        request = request.with_body("format", Value::String(format.clone()));
    }
    for raw in &cli.query {
        let (key, value) = params::parse_pair(raw)?;
        request = request.with_query(key, value);
    }
    for raw in &cli.params {
        let (key, value) = params::parse_pair(raw)?;
        request = request.with_body(key, value);
    }
    for raw in &cli.files {
        let (key, descriptor) = params::file_descriptor(raw)?;
        request = request.with_file(key, descriptor);
    }
    Ok(request)
}

/// Render the result pool the way the pass asked for.
fn render(outcome: &PassOutcome) -> Result<String> {
    match outcome.format {
        Format::Json => Ok(format!(
            "{}\n",
            serde_json::to_string_pretty(&outcome.results)?
        )),
        Format::Raw => {
            let mut out = String::new();
            for (key, value) in outcome.results.iter() {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.push_str(&format!("{key}: {text}\n"));
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("cmdmap").chain(args.iter().copied()))
    }

    #[test]
    fn request_carries_directives_and_params() {
        let cli = cli(&[
            "--cmd",
            "math\\calc",
            "--map",
            "math\\calc\\sum\\total:total",
            "-p",
            "numbers=[1,2]",
            "-q",
            "who=me",
        ]);
        let request = build_request(&cli).unwrap();
        assert_eq!(request.body.get("cmd"), Some(&json!("math\\calc")));
        assert_eq!(request.body.get("numbers"), Some(&json!([1, 2])));
        assert_eq!(request.query.get("who"), Some(&json!("me")));
    }

    #[test]
    fn config_file_is_read_and_flags_override_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdmap.toml");
        std::fs::write(&path, "safe_zone = true\naccept_query = true\n").unwrap();
        let path = path.to_str().unwrap();

        let plain = effective_config(&cli(&["--cmd", "a\\b", "--config", path])).unwrap();
        assert!(plain.safe_zone);
        assert!(plain.accept_query);

        let overridden = effective_config(&cli(&[
            "--cmd",
            "a\\b",
            "--config",
            path,
            "--no-safe-zone",
            "--body-only",
        ]))
        .unwrap();
        assert!(!overridden.safe_zone);
        assert!(!overridden.accept_query);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config =
            effective_config(&cli(&["--cmd", "a\\b", "--config", path.to_str().unwrap()]))
                .unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdmap.toml");
        std::fs::write(&path, "safe_zone = \"sometimes\"\n").unwrap();
        assert!(effective_config(&cli(&["--cmd", "a\\b", "--config", path.to_str().unwrap()]))
            .is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let cli = cli(&["--cmd", "a\\b", "--format", "xml"]);
        assert!(build_request(&cli).is_err());
    }

    #[test]
    fn raw_rendering_prints_one_line_per_result() {
        let dispatcher = Dispatcher::new(DispatchConfig::default(), demo::catalog().unwrap());
        let request = build_request(&cli(&[
            "--cmd",
            "text\\case",
            "--format",
            "raw",
            "-p",
            "text=Hi",
        ]))
        .unwrap();
        let rendered = render(&dispatcher.handle(request)).unwrap();
        assert!(rendered.contains("text\\case\\upper: HI\n"));
        assert!(rendered.contains("text\\case\\lower: hi\n"));
    }
}
