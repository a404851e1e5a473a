//! # waimai-report
//!
//! Generate Meituan-waimai restaurant analysis reports from a structured fact
//! sheet, using an OpenAI-compatible chat-completion endpoint for the actual
//! writing.
//!
//! ## Why this crate?
//!
//! Shop owners fill in a short form (store facts, trade-area facts, menu,
//! 30-day funnel numbers); turning that into a report a human would pay for
//! is a prompt-engineering and output-hygiene problem, not a templating one.
//! This crate owns exactly that part: validating the requested module,
//! rendering a module-specific prompt where every blank fact becomes an
//! explicit 未提供 (so the model cannot quietly invent facts), calling the
//! upstream model, and repairing the one failure mode models exhibit in
//! practice — answering in raw HTML instead of Markdown.
//!
//! HTTP serving, Markdown→HTML rendering, PDF export, and form handling are
//! the caller's business; this crate is the pipeline between them.
//!
//! ## Pipeline Overview
//!
//! ```text
//! GenerateRequest
//!  │
//!  ├─ 1. Validate  module id → ReportModule (closed set of four)
//!  ├─ 2. Resolve   Settings → UpstreamConfig (per-module model override)
//!  ├─ 3. Prompt    module template + payload facts (未提供 placeholders)
//!  ├─ 4. Call      POST chat/completions (text, or text+image for market)
//!  ├─ 5. Repair    if output looks like HTML: one corrective call, at most
//!  └─ 6. Assemble  markdown + meta (title/subtitle) + created_at
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waimai_report::{generate, GenerateRequest, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads UPSTREAM_API_KEY, UPSTREAM_BASE_URL, UPSTREAM_MODEL_* …
//!     let settings = Settings::from_env();
//!     let client = reqwest::Client::new();
//!
//!     let request: GenerateRequest = serde_json::from_str(
//!         r#"{ "module": "brand", "payload": { "storeName": "示例店" } }"#,
//!     )?;
//!
//!     let report = generate(&client, &settings, &request).await?;
//!     println!("{}", report.markdown);
//!     eprintln!("{} — {}", report.meta.title, report.created_at);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! | Key | Default | Effect |
//! |-----|---------|--------|
//! | `UPSTREAM_API_KEY` | — | required; checked before any network call |
//! | `UPSTREAM_BASE_URL` | `https://jeniya.top/v1/chat/completions` | POST target |
//! | `UPSTREAM_MODEL_DEFAULT` | `gemini-2.5-flash-lite` | model when no override applies |
//! | `UPSTREAM_MODEL_BRAND` / `_MARKET` / `_STORE_ACTIVITY` / `_DATA_STATISTICS` | empty | per-module override |
//!
//! Blank values fall back to the default, same as unset ones.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod meta;
pub mod module;
mod payload;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Settings, UpstreamConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::ReportError;
pub use generate::{generate, GenerateRequest, GenerationResult};
pub use meta::{build_meta, ReportMeta};
pub use module::{ModuleTheme, ReportModule};
