//! Defensive payload field coercion.
//!
//! The payload is an open `serde_json::Value` object — whatever the form
//! layer collected. No schema is enforced; instead every read goes through
//! one formatter with the shared policy: stringify, trim, and substitute the
//! 未提供 placeholder for anything missing or blank. The model must never see
//! an empty value — blank facts make it invent facts.

use serde_json::Value;

/// Placeholder rendered for a missing or blank field.
pub const NOT_PROVIDED: &str = "未提供";

/// Core formatter behind every payload read.
///
/// `numeric` selects the funnel-data policy: zero and negative numbers are
/// valid measurements and pass through verbatim; only null/missing/blank
/// degrade to the placeholder. Without `numeric`, falsy scalars (`0`,
/// `false`) degrade too — a store name of `0` is an absent fact, an exposure
/// count of `0` is data. Arrays and objects in a scalar position degrade to
/// the placeholder either way — structured fields (menus) have their own
/// rendering path.
pub(crate) fn format_field(value: Option<&Value>, placeholder: &str, numeric: bool) -> String {
    match value {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                placeholder.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Some(Value::Number(n)) => {
            if !numeric && n.as_f64() == Some(0.0) {
                placeholder.to_string()
            } else {
                n.to_string()
            }
        }
        Some(Value::Bool(b)) => {
            if !numeric && !*b {
                placeholder.to_string()
            } else {
                b.to_string()
            }
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => placeholder.to_string(),
    }
}

/// First non-blank value among `keys`, trimmed; empty string when none.
///
/// Multiple keys cover the two field casings historic frontends send
/// (`storeName` and `store-name`).
pub(crate) fn text_field(payload: &Value, keys: &[&str]) -> String {
    for key in keys {
        let rendered = format_field(payload.get(key), "", false);
        if !rendered.is_empty() {
            return rendered;
        }
    }
    String::new()
}

/// Like [`text_field`] but renders 未提供 when every key is missing or blank.
pub(crate) fn text_field_or_placeholder(payload: &Value, keys: &[&str]) -> String {
    let rendered = text_field(payload, keys);
    if rendered.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        rendered
    }
}

/// Funnel-data read: null/missing/blank → 未提供, zero and negative numbers
/// verbatim.
pub(crate) fn stat_field(payload: &Value, key: &str) -> String {
    format_field(payload.get(key), NOT_PROVIDED, true)
}

/// JSON-level truthiness for flag fields (`enableScreenshotAnalysis`).
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
