//! Error types for the waimai-report library.
//!
//! The taxonomy keeps two failure classes architecturally distinct:
//!
//! * **Quality** — the upstream answered, but the answer is unusable or
//!   HTML-contaminated. Contamination is handled by the repair pass in
//!   [`crate::generate`], never by retrying transport; an unusable response
//!   shape surfaces as [`ReportError::Format`].
//!
//! * **Transport/configuration** — the call could not be made or did not
//!   succeed at the HTTP level. These fail the pipeline immediately; there is
//!   no retry and no partial result.
//!
//! Messages are the user-facing Chinese strings the product has always shown;
//! callers render `Display` verbatim.

use thiserror::Error;

/// All errors returned by the report generation pipeline.
#[derive(Debug, Error)]
pub enum ReportError {
    /// `UPSTREAM_API_KEY` resolved to empty. Raised before any network I/O.
    #[error("未配置UPSTREAM_API_KEY，无法调用上游接口")]
    MissingApiKey,

    /// The request named a module outside the supported set.
    #[error("不支持的module: {0}")]
    UnsupportedModule(String),

    /// The attached screenshot is not a base64 image data URL.
    #[error("截图格式不支持，需要 data:image/...;base64 数据")]
    InvalidScreenshot,

    /// Upstream returned a non-success HTTP status.
    ///
    /// `body` is pre-truncated to the first 500 characters of the response —
    /// enough to diagnose, bounded enough to log.
    #[error("上游接口返回错误: {status} {body}")]
    Upstream { status: u16, body: String },

    /// Upstream reported success but the response shape is unusable
    /// (missing `choices[0].message.content`, or not JSON at all).
    #[error("上游接口返回格式异常（{0}）")]
    Format(String),

    /// Transport-level failure before any HTTP status was received.
    #[error("上游接口网络错误: {0}")]
    Http(String),
}
