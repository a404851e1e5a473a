//! Upstream configuration resolved from environment-style sources.
//!
//! Every key is read with the same rule: take the raw value, trim it, and
//! fall back to the default when the key is absent or blank. A blank override
//! therefore behaves exactly like an unset one, which keeps `.env` files with
//! empty placeholder lines harmless.
//!
//! [`Settings`] is resolved once per invocation and never mutated; the
//! per-call [`UpstreamConfig`] (base URL + key + effective model) is derived
//! from it by [`Settings::upstream_for`].

use crate::error::ReportError;
use crate::module::ReportModule;
use std::fmt;

/// Chat-completion POST target when `UPSTREAM_BASE_URL` is not configured.
pub const DEFAULT_BASE_URL: &str = "https://jeniya.top/v1/chat/completions";

/// Model used when neither `UPSTREAM_MODEL_DEFAULT` nor a module override
/// is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Resolved upstream configuration for the pipeline.
///
/// Build with [`Settings::from_env`] in production, or
/// [`Settings::from_lookup`] over any key→value source in tests.
#[derive(Clone)]
pub struct Settings {
    /// Bearer token for the upstream endpoint. May be empty here; emptiness
    /// is rejected by [`Settings::upstream_for`] before any network I/O.
    pub api_key: String,
    /// Full chat-completion endpoint URL.
    pub base_url: String,
    /// Model id used when no module override applies.
    pub model_default: String,
    model_brand: String,
    model_market: String,
    model_store_activity: String,
    model_data_statistics: String,
}

impl Settings {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key→value source.
    ///
    /// `lookup` returning `None` and returning a blank string are treated
    /// identically: the key's default applies.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, fallback: &str| -> String {
            match lookup(key) {
                Some(raw) => {
                    let value = raw.trim();
                    if value.is_empty() {
                        fallback.to_string()
                    } else {
                        value.to_string()
                    }
                }
                None => fallback.to_string(),
            }
        };

        Settings {
            api_key: read("UPSTREAM_API_KEY", ""),
            base_url: read("UPSTREAM_BASE_URL", DEFAULT_BASE_URL),
            model_default: read("UPSTREAM_MODEL_DEFAULT", DEFAULT_MODEL),
            model_brand: read("UPSTREAM_MODEL_BRAND", ""),
            model_market: read("UPSTREAM_MODEL_MARKET", ""),
            model_store_activity: read("UPSTREAM_MODEL_STORE_ACTIVITY", ""),
            model_data_statistics: read("UPSTREAM_MODEL_DATA_STATISTICS", ""),
        }
    }

    /// The effective model for a module: the module override when configured
    /// and non-empty, else the default.
    pub fn model_for(&self, module: ReportModule) -> &str {
        let override_model = match module {
            ReportModule::Brand => &self.model_brand,
            ReportModule::Market => &self.model_market,
            ReportModule::StoreActivity => &self.model_store_activity,
            ReportModule::DataStatistics => &self.model_data_statistics,
        };
        if override_model.is_empty() {
            &self.model_default
        } else {
            override_model
        }
    }

    /// Upstream coordinates for one invocation.
    ///
    /// Fails with [`ReportError::MissingApiKey`] when no key is configured —
    /// the pipeline's fail-fast gate before any network call.
    pub fn upstream_for(&self, module: ReportModule) -> Result<UpstreamConfig, ReportError> {
        if self.api_key.is_empty() {
            return Err(ReportError::MissingApiKey);
        }
        Ok(UpstreamConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model_for(module).to_string(),
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model_default", &self.model_default)
            .field("model_brand", &self.model_brand)
            .field("model_market", &self.model_market)
            .field("model_store_activity", &self.model_store_activity)
            .field("model_data_statistics", &self.model_data_statistics)
            .finish()
    }
}

/// Coordinates for a single chat-completion call. Resolved once per
/// invocation (the repair call reuses the same instance).
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
