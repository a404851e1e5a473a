//! Upstream chat-completion client (OpenAI-compatible wire format).
//!
//! This module is intentionally thin — prompt text lives in
//! [`crate::prompts`] and the repair decision in [`crate::generate`], so the
//! code here only builds the message list, performs the POST, and validates
//! the response shape.
//!
//! There is no transport retry: a failed call fails the whole invocation.
//! The only second call the pipeline ever makes is the quality-repair pass,
//! which is a content decision, not an error-recovery one.

use crate::config::UpstreamConfig;
use crate::error::ReportError;
use crate::pipeline::postprocess::normalize_markdown;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling temperature for the primary generation call. High enough for
/// varied, readable prose.
pub const PRIMARY_TEMPERATURE: f64 = 0.8;

/// Temperature for the repair call — reformatting wants determinism,
/// not creativity.
pub const REPAIR_TEMPERATURE: f64 = 0.2;

/// Token ceiling for every call. Full reports run long; truncation
/// mid-section reads as a bug to the end user.
pub const MAX_TOKENS: u32 = 16_384;

/// Upstream error bodies are truncated to this many characters before being
/// carried in [`ReportError::Upstream`].
const ERROR_BODY_LIMIT: usize = 500;

/// One message in the chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system",
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user",
            content: MessageContent::Text(content.into()),
        }
    }
}

/// Message content: a bare string, or ordered parts when an image rides
/// along. Serialized untagged so the wire shape matches the OpenAI API.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One entry of a multimodal content array.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Build the message list for one call: always a system message plus a user
/// message. With an image the user content becomes a `[text, image_url]`
/// parts array — the single point where the pipeline is multimodal.
pub fn build_messages(
    system: &str,
    user_prompt: &str,
    image_data_url: Option<&str>,
) -> Vec<ChatMessage> {
    let user = match image_data_url {
        Some(url) => ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: user_prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: url.to_string(),
                    },
                },
            ]),
        },
        None => ChatMessage::user(user_prompt),
    };
    vec![ChatMessage::system(system), user]
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// POST one chat completion and return the fence-normalized content.
///
/// Failure modes map onto the error taxonomy:
/// - transport failure → [`ReportError::Http`]
/// - non-success status → [`ReportError::Upstream`] with the status and the
///   first 500 characters of the body
/// - success without usable `choices[0].message.content` →
///   [`ReportError::Format`]
pub async fn chat_completions(
    client: &Client,
    cfg: &UpstreamConfig,
    messages: &[ChatMessage],
    temperature: f64,
) -> Result<String, ReportError> {
    let body = ChatRequest {
        model: &cfg.model,
        messages,
        temperature,
        max_tokens: MAX_TOKENS,
        stream: false,
    };

    debug!(
        model = %cfg.model,
        messages = messages.len(),
        temperature,
        "requesting chat completion"
    );

    let response = client
        .post(&cfg.base_url)
        .bearer_auth(&cfg.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| ReportError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ReportError::Upstream {
            status: status.as_u16(),
            body: text.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|_| ReportError::Format("响应不是有效JSON".to_string()))?;

    let content = parsed
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .unwrap_or("");

    if content.is_empty() {
        return Err(ReportError::Format(
            "缺少choices/message/content".to_string(),
        ));
    }

    Ok(normalize_markdown(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_message_serializes_as_bare_string() {
        let messages = build_messages("系统", "用户提问", None);
        let wire = serde_json::to_value(&messages).unwrap();
        assert_eq!(
            wire,
            json!([
                { "role": "system", "content": "系统" },
                { "role": "user", "content": "用户提问" },
            ])
        );
    }

    #[test]
    fn image_message_serializes_as_parts_array() {
        let messages = build_messages("系统", "分析截图", Some("data:image/png;base64,AAAA"));
        let wire = serde_json::to_value(&messages).unwrap();
        assert_eq!(
            wire,
            json!([
                { "role": "system", "content": "系统" },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "分析截图" },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } },
                    ]
                },
            ])
        );
    }

    #[test]
    fn request_body_wire_shape() {
        let messages = build_messages("s", "u", None);
        let body = ChatRequest {
            model: "gemini-2.5-flash-lite",
            messages: &messages,
            temperature: PRIMARY_TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };
        let wire = serde_json::to_value(&body).unwrap();
        assert_eq!(wire["model"], "gemini-2.5-flash-lite");
        assert_eq!(wire["temperature"], json!(0.8));
        assert_eq!(wire["max_tokens"], json!(16_384));
        assert_eq!(wire["stream"], json!(false));
        assert_eq!(wire["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn response_shape_tolerates_missing_fields() {
        let parsed: ChatResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.choices.is_empty());

        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": {} }]
        }))
        .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
