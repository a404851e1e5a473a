//! Report generation pipeline: the orchestrator.
//!
//! The pipeline is a short linear state machine with exactly two paths:
//!
//! ```text
//! START ─▶ validate module ─▶ resolve settings & model ─▶ build prompt
//!        ─▶ build messages ─▶ PRIMARY CALL ─▶ clean ──────────────▶ DONE
//!                                          ─▶ HTML-contaminated
//!                                             ─▶ REPAIR CALL ─────▶ DONE
//! ```
//!
//! The repair call runs at most once and its output is final even when it is
//! still contaminated — repair is a bounded quality pass, not a convergence
//! loop. Transport failures are never retried; whichever call fails, that
//! error is the pipeline's result.
//!
//! Invocations share nothing: payload, message lists, and resolved config are
//! created and dropped per call, so any number may run concurrently. There is
//! no timeout or cancellation here — a hung upstream blocks the invocation;
//! bounding that is the caller's extension point (e.g. a reqwest client
//! built with a timeout).

use crate::config::Settings;
use crate::error::ReportError;
use crate::meta::{build_meta, ReportMeta};
use crate::module::ReportModule;
use crate::pipeline::{llm, postprocess};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Inbound request shape, as produced by an external HTTP layer or the CLI.
///
/// `screenshotDataUrl` is accepted as an alias because that is the casing the
/// browser frontend sends.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Wire identifier of the report module.
    pub module: String,
    /// Module-specific fact sheet. Anything other than a JSON object is
    /// treated as empty.
    #[serde(default)]
    pub payload: Value,
    /// Optional competitor screenshot as a base64 image data URL. Only the
    /// market module attaches it to the upstream call; it is echoed back in
    /// the result for every module.
    #[serde(default, alias = "screenshotDataUrl")]
    pub screenshot_data_url: Option<String>,
}

/// Terminal artifact of one pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub module: ReportModule,
    pub markdown: String,
    pub meta: ReportMeta,
    pub screenshot_data_url: Option<String>,
    /// RFC 3339 UTC timestamp taken when the result was assembled.
    pub created_at: String,
}

static RE_IMAGE_DATA_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,").unwrap());

/// Run the full pipeline for one request.
///
/// Fails fast — before any network I/O — on an unknown module, a missing API
/// key, or a malformed screenshot attachment. After that, at most two
/// upstream calls happen: the primary generation and, only when the primary
/// output looks like raw HTML, one corrective call.
pub async fn generate(
    client: &Client,
    settings: &Settings,
    request: &GenerateRequest,
) -> Result<GenerationResult, ReportError> {
    let module = ReportModule::parse(&request.module)?;
    let empty = Value::Null;
    let payload = if request.payload.is_object() {
        &request.payload
    } else {
        &empty
    };

    let cfg = settings.upstream_for(module)?;

    // Only the market module is multimodal; everything else ignores the
    // screenshot at the upstream boundary.
    let screenshot = if module == ReportModule::Market {
        request
            .screenshot_data_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    } else {
        None
    };
    if let Some(url) = screenshot {
        if !RE_IMAGE_DATA_URL.is_match(url) {
            return Err(ReportError::InvalidScreenshot);
        }
    }

    info!(module = %module, model = %cfg.model, "generating report");

    let prompt = prompts::build_prompt(module, payload);
    let messages = llm::build_messages(prompts::SYSTEM_PROMPT, &prompt, screenshot);

    let mut markdown =
        llm::chat_completions(client, &cfg, &messages, llm::PRIMARY_TEMPERATURE).await?;

    if postprocess::looks_like_html(&markdown) {
        warn!(module = %module, "primary output looks like HTML, requesting repair");
        let repair_prompt = prompts::build_repair_prompt(&markdown);
        let repair_messages =
            llm::build_messages(prompts::REPAIR_SYSTEM_PROMPT, &repair_prompt, None);
        markdown =
            llm::chat_completions(client, &cfg, &repair_messages, llm::REPAIR_TEMPERATURE).await?;
    }

    let meta = build_meta(module, payload);
    info!(module = %module, bytes = markdown.len(), "report generated");

    Ok(GenerationResult {
        module,
        markdown,
        meta,
        screenshot_data_url: request.screenshot_data_url.clone(),
        created_at: now_rfc3339(),
    })
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
