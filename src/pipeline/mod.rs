//! Pipeline stages for report generation.
//!
//! Each submodule implements exactly one transformation step, keeping the
//! stages independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! prompt ──▶ llm ──▶ postprocess ──▶ (repair llm call) ──▶ markdown
//! (template)  (chat completion)  (fences, HTML check)   (at most once)
//! ```
//!
//! 1. [`llm`]         — build the chat message list and drive the completion
//!    call; the only stage with network I/O
//! 2. [`postprocess`] — deterministic cleanup of model output (fence
//!    stripping) and HTML-contamination detection feeding the repair decision

pub mod llm;
pub mod postprocess;
