//! End-to-end pipeline tests against a mocked upstream.
//!
//! Every test stands up a local wiremock server playing the chat-completion
//! endpoint, so the full pipeline — module validation, config resolution,
//! prompt construction, HTTP call, repair pass, result assembly — runs
//! exactly as in production, with deterministic responses and a verifiable
//! call count.

use serde_json::{json, Value};
use waimai_report::{generate, GenerateRequest, ReportError, Settings};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1/chat/completions";

/// Settings pointing at the mock server, plus any extra keys.
fn settings_for(server: &MockServer, extra: &[(&str, &str)]) -> Settings {
    let base_url = format!("{}{ENDPOINT}", server.uri());
    let mut pairs = vec![
        ("UPSTREAM_API_KEY".to_string(), "sk-test".to_string()),
        ("UPSTREAM_BASE_URL".to_string(), base_url),
    ];
    pairs.extend(
        extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    Settings::from_lookup(move |key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

fn brand_request() -> GenerateRequest {
    serde_json::from_value(json!({
        "module": "brand",
        "payload": { "storeName": "示例店" }
    }))
    .unwrap()
}

async fn recorded_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| serde_json::from_slice(&req.body).expect("request body must be JSON"))
        .collect()
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn clean_response_needs_exactly_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(completion("# 标题"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let result = generate(&client, &settings, &brand_request())
        .await
        .expect("pipeline must succeed");

    assert_eq!(result.markdown, "# 标题");
    assert_eq!(result.meta.title, "示例店 品牌定位分析报告");
    assert_eq!(result.module.as_str(), "brand");
    assert!(result.screenshot_data_url.is_none());
    assert!(!result.created_at.is_empty());

    let bodies = recorded_bodies(&server).await;
    assert_eq!(bodies.len(), 1, "no repair call for clean output");
    assert_eq!(bodies[0]["model"], "gemini-2.5-flash-lite");
    assert_eq!(bodies[0]["temperature"], json!(0.8));
    assert_eq!(bodies[0]["max_tokens"], json!(16_384));
    assert_eq!(bodies[0]["stream"], json!(false));
}

#[tokio::test]
async fn fenced_response_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion("```markdown\n# 标题\n正文\n```"))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let result = generate(&client, &settings, &brand_request()).await.unwrap();
    assert_eq!(result.markdown, "# 标题\n正文");
}

#[tokio::test]
async fn module_model_override_reaches_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion("# ok"))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[("UPSTREAM_MODEL_BRAND", "brand-pro")]);
    let client = reqwest::Client::new();

    generate(&client, &settings, &brand_request()).await.unwrap();

    let bodies = recorded_bodies(&server).await;
    assert_eq!(bodies[0]["model"], "brand-pro");
}

#[tokio::test]
async fn prompt_carries_facts_and_placeholders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion("# ok"))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    generate(&client, &settings, &brand_request()).await.unwrap();

    let bodies = recorded_bodies(&server).await;
    let user_prompt = bodies[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("## 店铺信息"));
    assert!(user_prompt.contains("店铺名称：示例店"));
    assert!(user_prompt.contains("经营品类：未提供"));
}

// ── Repair path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn html_contamination_triggers_exactly_one_repair_call() {
    let server = MockServer::start().await;

    // The repair prompt embeds the corrective instruction; match it first so
    // the second call gets the clean response.
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("请将下面内容转换为Markdown正文"))
        .respond_with(completion("```markdown\n# 修复后的报告\n```"))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion(
            "<div><h1>标题</h1><p>段落</p><ul><li>项</li></ul></div>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let result = generate(&client, &settings, &brand_request()).await.unwrap();

    // the repaired (and normalized) text is the final result
    assert_eq!(result.markdown, "# 修复后的报告");

    let bodies = recorded_bodies(&server).await;
    assert_eq!(bodies.len(), 2, "primary + one repair call");
    assert_eq!(bodies[0]["temperature"], json!(0.8));
    assert_eq!(bodies[1]["temperature"], json!(0.2));

    // repair embeds the contaminated text and drops the image path
    let repair_prompt = bodies[1]["messages"][1]["content"].as_str().unwrap();
    assert!(repair_prompt.contains("<div>"));
    let repair_system = bodies[1]["messages"][0]["content"].as_str().unwrap();
    assert!(repair_system.contains("专业内容编辑"));
}

#[tokio::test]
async fn still_contaminated_repair_output_is_returned_as_is() {
    let server = MockServer::start().await;

    let second = "<div><h2>仍然</h2><p>是HTML</p><ol><li>项</li></ol></div>";
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("请将下面内容转换为Markdown正文"))
        .respond_with(completion(second))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion(
            "<div><h1>一</h1><p>二</p><ul><li>三</li></ul></div>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let result = generate(&client, &settings, &brand_request()).await.unwrap();

    // bounded effort: no third call, contaminated repair output stands
    assert_eq!(result.markdown, second);
    assert_eq!(recorded_bodies(&server).await.len(), 2);
}

// ── Multimodal path ──────────────────────────────────────────────────────────

#[tokio::test]
async fn market_screenshot_becomes_an_image_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion("# 商圈报告"))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let request: GenerateRequest = serde_json::from_value(json!({
        "module": "market",
        "payload": { "areaName": "A区", "enableScreenshotAnalysis": true },
        "screenshotDataUrl": "data:image/png;base64,iVBORw0KGgo="
    }))
    .unwrap();

    let result = generate(&client, &settings, &request).await.unwrap();
    assert_eq!(
        result.screenshot_data_url.as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
    assert_eq!(result.meta.title, "A区 商圈调研分析报告");

    let bodies = recorded_bodies(&server).await;
    let content = &bodies[0]["messages"][1]["content"];
    let parts = content.as_array().expect("user content must be parts");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["type"], "text");
    assert!(parts[0]["text"]
        .as_str()
        .unwrap()
        .contains("截图分析：开启"));
    assert_eq!(parts[1]["type"], "image_url");
    assert_eq!(
        parts[1]["image_url"]["url"],
        "data:image/png;base64,iVBORw0KGgo="
    );
}

#[tokio::test]
async fn non_market_modules_ignore_the_screenshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion("# ok"))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let request: GenerateRequest = serde_json::from_value(json!({
        "module": "brand",
        "payload": { "storeName": "示例店" },
        "screenshotDataUrl": "data:image/png;base64,iVBORw0KGgo="
    }))
    .unwrap();

    let result = generate(&client, &settings, &request).await.unwrap();

    // echoed in the envelope, absent from the upstream call
    assert!(result.screenshot_data_url.is_some());
    let bodies = recorded_bodies(&server).await;
    assert!(bodies[0]["messages"][1]["content"].is_string());
}

#[tokio::test]
async fn malformed_screenshot_fails_before_any_call() {
    let server = MockServer::start().await;
    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let request: GenerateRequest = serde_json::from_value(json!({
        "module": "market",
        "payload": {},
        "screenshotDataUrl": "https://example.com/shot.png"
    }))
    .unwrap();

    let err = generate(&client, &settings, &request).await.unwrap_err();
    assert!(matches!(err, ReportError::InvalidScreenshot));
    assert!(recorded_bodies(&server).await.is_empty());
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_api_key_makes_zero_calls() {
    let server = MockServer::start().await;
    let base_url = format!("{}{ENDPOINT}", server.uri());
    let settings =
        Settings::from_lookup(move |key| match key {
            "UPSTREAM_BASE_URL" => Some(base_url.clone()),
            _ => None,
        });
    let client = reqwest::Client::new();

    let err = generate(&client, &settings, &brand_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::MissingApiKey));
    assert!(recorded_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn unknown_module_fails_before_any_call() {
    let server = MockServer::start().await;
    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let request: GenerateRequest =
        serde_json::from_value(json!({ "module": "poster-design" })).unwrap();

    let err = generate(&client, &settings, &request).await.unwrap_err();
    assert!(err.to_string().contains("poster-design"));
    assert!(recorded_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn upstream_error_carries_status_and_truncated_body() {
    let server = MockServer::start().await;
    let long_body = "e".repeat(700);
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(502).set_body_string(long_body))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let err = generate(&client, &settings, &brand_request())
        .await
        .unwrap_err();
    match err {
        ReportError::Upstream { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body.chars().count(), 500, "body must be truncated");
        }
        other => panic!("expected Upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_content_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(completion(""))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let err = generate(&client, &settings, &brand_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Format(_)));
}

#[tokio::test]
async fn missing_choices_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .mount(&server)
        .await;

    let settings = settings_for(&server, &[]);
    let client = reqwest::Client::new();

    let err = generate(&client, &settings, &brand_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Format(_)));
}

#[tokio::test]
async fn transport_failure_on_primary_call_propagates() {
    // port 9 (discard) is never a chat endpoint; the connection is refused
    let settings = Settings::from_lookup(|key| match key {
        "UPSTREAM_API_KEY" => Some("sk-test".to_string()),
        "UPSTREAM_BASE_URL" => Some(format!("http://127.0.0.1:9{ENDPOINT}")),
        _ => None,
    });
    let client = reqwest::Client::new();

    let err = generate(&client, &settings, &brand_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Http(_)));
}
