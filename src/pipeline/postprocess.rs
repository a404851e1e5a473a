//! Post-processing: deterministic cleanup and inspection of model output.
//!
//! Even well-prompted models occasionally disobey the output rules in two
//! specific ways this module handles:
//!
//! - Wrapping the whole answer in ` ```markdown ... ``` ` fences despite the
//!   prompt saying not to — fixed locally by [`normalize_markdown`].
//! - Answering in raw HTML instead of Markdown — detected by
//!   [`looks_like_html`]; fixing it needs a second model call, owned by the
//!   orchestrator, because a mechanical HTML→Markdown pass would mangle the
//!   prose.
//!
//! Both functions are pure; [`normalize_markdown`] is idempotent.

/// Markers counted by [`looks_like_html`]. Hits are counted per distinct
/// marker, not per occurrence.
const HTML_MARKERS: [&str; 11] = [
    "<div", "</div", "<p", "</p", "<h1", "<h2", "<h3", "<ul", "<ol", "<li", "</li",
];

/// Distinct-marker threshold at which text counts as HTML-contaminated.
/// One or two markers are common in legitimate Markdown (inline examples,
/// `<br>`-style line notes); three distinct structural tags are not.
const HTML_MARKER_THRESHOLD: usize = 3;

/// Strip an enclosing code fence from model output.
///
/// If the trimmed text starts with a triple-backtick fence, the outer fence
/// pair is removed (inner fences survive) and a leading bare `markdown` or
/// `md` language tag line is dropped. Text without an opening fence, or with
/// an unpaired one, is returned trimmed but otherwise untouched.
pub fn normalize_markdown(text: &str) -> String {
    let s = text.trim();
    if !s.starts_with("```") {
        return s.to_string();
    }

    let parts: Vec<&str> = s.split("```").collect();
    if parts.len() < 3 {
        // opening fence without a closing one; leave as-is
        return s.to_string();
    }

    let inner = parts[1..parts.len() - 1].join("```");
    let inner = inner.trim();

    let inner = match inner.split_once('\n') {
        Some((tag, rest)) if tag == "markdown" || tag == "md" => rest,
        _ => inner,
    };

    inner.trim().to_string()
}

/// Classify text as HTML-contaminated.
///
/// Case-insensitive; true iff at least [`HTML_MARKER_THRESHOLD`] distinct
/// markers from the fixed set occur.
pub fn looks_like_html(text: &str) -> bool {
    let lower = text.to_lowercase();
    let hits = HTML_MARKERS
        .iter()
        .filter(|marker| lower.contains(*marker))
        .count();
    hits >= HTML_MARKER_THRESHOLD
}
