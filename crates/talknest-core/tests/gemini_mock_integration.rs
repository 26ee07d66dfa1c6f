use std::sync::Arc;

use talknest_core::{CustomScenarioInput, RoleplayClient};
use talknest_provider::{CompletionProvider, CompletionRequest, GeminiProvider, Turn};
use talknest_schema::Message;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-3-flash-preview";
const GENERATE_PATH: &str = "/models/gemini-3-flash-preview:generateContent";

fn mock_gemini_text(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
    })
}

fn mock_gemini_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": {"code": status, "message": message, "status": "UNAVAILABLE"}
    }))
}

fn roleplay_client(server: &MockServer) -> RoleplayClient {
    let provider = Arc::new(GeminiProvider::new("test-key", server.uri()));
    RoleplayClient::new(provider, MODEL, 0.7)
}

#[tokio::test]
async fn gemini_basic_completion_with_key_verification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_gemini_text("你怎么又来烦我。")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let resp = provider
        .complete(CompletionRequest {
            model: MODEL.into(),
            system: Some("扮演孩子".into()),
            turns: vec![Turn::user("我们聊聊？")],
            temperature: Some(0.7),
            response_schema: None,
        })
        .await
        .unwrap();

    assert_eq!(resp.text, "你怎么又来烦我。");
    assert_eq!(resp.input_tokens, Some(10));
    assert_eq!(resp.output_tokens, Some(5));
    assert_eq!(resp.finish_reason.as_deref(), Some("end_turn"));
}

#[tokio::test]
async fn gemini_server_error_is_marked_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(mock_gemini_error(503, "model overloaded"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let err = provider
        .complete(CompletionRequest::simple(MODEL.into(), None, "你好".into()))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("[retryable]"), "got: {message}");
    assert!(message.contains("503"), "got: {message}");
}

#[tokio::test]
async fn gemini_client_error_is_not_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(mock_gemini_error(400, "invalid request"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let err = provider
        .complete(CompletionRequest::simple(MODEL.into(), None, "你好".into()))
        .await
        .unwrap_err();

    assert!(!err.to_string().contains("[retryable]"));
}

#[tokio::test]
async fn child_reply_flow_sends_persona_over_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("你现在扮演一个青春期的孩子"))
        .and(body_string_contains("孩子期中考试没考好"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_gemini_text("考砸了，烦死了。")))
        .expect(1)
        .mount(&server)
        .await;

    let client = roleplay_client(&server);
    let transcript = vec![Message::child("别问了。"), Message::parent("这次考试怎么样？")];
    let reply = client
        .next_child_reply("孩子期中考试没考好", &transcript)
        .await
        .unwrap();

    assert_eq!(reply, "考砸了，烦死了。");
}

#[tokio::test]
async fn empty_reply_degrades_to_placeholder_over_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_gemini_text("")))
        .mount(&server)
        .await;

    let client = roleplay_client(&server);
    let reply = client
        .next_child_reply("场景", &[Message::parent("你好")])
        .await
        .unwrap();

    assert_eq!(reply, "...");
}

#[tokio::test]
async fn assessment_flow_parses_the_structured_report() {
    let server = MockServer::start().await;

    let report_json = r#"{
        "empathy": {"level": "较好", "reason": "能够回应孩子的情绪"},
        "listening": {"level": "一般", "reason": "有倾听但急于给建议"},
        "emotion": {"level": "较好", "reason": "全程语气平稳"},
        "boundary": {"level": "需注意", "reason": "过度追问隐私"},
        "needs": {"level": "一般", "reason": "部分捕捉到孩子的需求"}
    }"#;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("responseSchema"))
        .and(body_string_contains("请生成评估报告"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_gemini_text(report_json)))
        .expect(1)
        .mount(&server)
        .await;

    let client = roleplay_client(&server);
    let transcript = vec![
        Message::child("你进来干嘛，出去！"),
        Message::parent("好，我先不进来。你愿意说的时候我都在。"),
    ];
    let report = client
        .assess_conversation(&transcript)
        .await
        .unwrap()
        .expect("report should parse");

    assert_eq!(report.empathy.level.label(), "较好");
    assert_eq!(report.boundary.level.label(), "需注意");
    assert_eq!(report.needs.reason, "部分捕捉到孩子的需求");
}

#[tokio::test]
async fn assessment_with_unstructured_reply_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_gemini_text("抱歉，我无法生成评估。")),
        )
        .mount(&server)
        .await;

    let client = roleplay_client(&server);
    let report = client
        .assess_conversation(&[Message::parent("你好")])
        .await
        .unwrap();

    assert!(report.is_none());
}

#[tokio::test]
async fn custom_scenario_draft_runs_title_and_opening_concurrently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("文案助手"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_gemini_text("深夜玩手机")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("第一句话"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_gemini_text("我马上就睡，你别盯着我。")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = roleplay_client(&server);
    let input = CustomScenarioInput {
        description: "孩子半夜躲在被窝里玩手机".to_string(),
        child_state: "叛逆".to_string(),
        goal: "约定一个双方都接受的睡前时间".to_string(),
    };
    let scenario = client
        .draft_custom_scenario(&input, &CancellationToken::new())
        .await
        .unwrap();

    assert!(scenario.id.starts_with("custom_"));
    assert_eq!(scenario.title, "深夜玩手机");
    assert_eq!(scenario.initial_message, "我马上就睡，你别盯着我。");
    assert_eq!(scenario.category, "自定义");
    assert!(scenario.description.contains("孩子当前状态：叛逆"));
    assert!(scenario
        .description
        .ends_with("沟通目标：约定一个双方都接受的睡前时间"));
}

#[tokio::test]
async fn draft_fails_when_the_title_request_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("文案助手"))
        .respond_with(mock_gemini_error(500, "internal error"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("第一句话"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_gemini_text("开场白")))
        .mount(&server)
        .await;

    let client = roleplay_client(&server);
    let input = CustomScenarioInput {
        description: "孩子拒绝上学".to_string(),
        child_state: "焦虑".to_string(),
        goal: String::new(),
    };
    let err = client
        .draft_custom_scenario(&input, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("[retryable]"));
}
