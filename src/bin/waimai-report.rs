//! CLI binary for waimai-report.
//!
//! A thin shim over the library crate: read a `GenerateRequest` JSON document
//! from a file or stdin, run the pipeline, print the result.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use waimai_report::{generate, GenerateRequest, Settings};

/// Generate a Meituan-waimai analysis report from a JSON request document.
///
/// The request document has the shape the web frontend sends:
///   { "module": "brand", "payload": { "storeName": "示例店", ... } }
///
/// Upstream configuration comes from the environment (UPSTREAM_API_KEY,
/// UPSTREAM_BASE_URL, UPSTREAM_MODEL_*).
#[derive(Parser, Debug)]
#[command(name = "waimai-report", version, about)]
struct Cli {
    /// Path to the request JSON document, or "-" for stdin.
    request: String,

    /// Print the full JSON result envelope instead of bare Markdown.
    #[arg(long)]
    json: bool,

    /// Write the output to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw = if cli.request == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.request)
            .with_context(|| format!("reading request file '{}'", cli.request))?
    };

    let request: GenerateRequest =
        serde_json::from_str(&raw).context("request document is not valid JSON")?;

    let settings = Settings::from_env();
    let client = reqwest::Client::new();

    let result = generate(&client, &settings, &request).await?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&result).context("serialising result")?
    } else {
        result.markdown.clone()
    };

    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("writing output to '{}'", path.display()))?;
            eprintln!("{} → {}", result.meta.title, path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
