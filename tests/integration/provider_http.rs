//! Provider clients against a mock HTTP server

use loafer::error::TransportFailure;
use loafer::provider::{
    AnthropicClient, ChatMessage, CompletionOptions, ModelProviderClient, OllamaClient,
    OpenAIClient,
};
use loafer::types::Role;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(Role::System, "You narrate an office."),
        ChatMessage::new(Role::User, "Start the day."),
    ]
}

fn options() -> CompletionOptions {
    CompletionOptions {
        temperature: Some(0.85),
        max_tokens: Some(256),
    }
}

#[tokio::test]
async fn openai_client_posts_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "gpt-test", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-test",
            "choices": [{
                "message": {"role": "assistant", "content": "{\"story_context\": \"hi\"}"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new("gpt-test".into(), "test-key".into(), Some(server.uri())).unwrap();
    let response = client.complete(messages(), options()).await.unwrap();

    assert_eq!(response.content, "{\"story_context\": \"hi\"}");
    assert_eq!(response.usage.total_tokens, 17);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn anthropic_client_lifts_system_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "secret"))
        .and(body_partial_json(json!({
            "system": "You narrate an office.",
            "messages": [{"role": "user", "content": "Start the day."}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "claude-test",
            "content": [{"type": "text", "text": "part one "}, {"type": "text", "text": "part two"}],
            "usage": {"input_tokens": 10, "output_tokens": 4},
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let client =
        AnthropicClient::new("claude-test".into(), "secret".into(), Some(server.uri())).unwrap();
    let response = client.complete(messages(), options()).await.unwrap();

    assert_eq!(response.content, "part one part two");
    assert_eq!(response.usage.total_tokens, 14);
}

#[tokio::test]
async fn auth_and_rate_limit_statuses_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer bad"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer busy"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let bad = OpenAIClient::new("m".into(), "bad".into(), Some(server.uri())).unwrap();
    let err = bad.complete(messages(), options()).await.unwrap_err();
    assert_eq!(err, TransportFailure::Auth("invalid key".into()));

    let busy = OpenAIClient::new("m".into(), "busy".into(), Some(server.uri())).unwrap();
    let err = busy.complete(messages(), options()).await.unwrap_err();
    assert_eq!(err, TransportFailure::RateLimit("slow down".into()));
}

#[tokio::test]
async fn server_error_and_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"model": "llama", "choices": []})))
        .mount(&server)
        .await;

    let ollama = OllamaClient::new("llama".into(), Some(server.uri())).unwrap();
    let err = ollama.complete(messages(), options()).await.unwrap_err();
    assert_eq!(err, TransportFailure::EmptyBody);

    let down = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&down)
        .await;
    let client = OpenAIClient::new("m".into(), "k".into(), Some(down.uri())).unwrap();
    let err = client.complete(messages(), options()).await.unwrap_err();
    assert_eq!(
        err,
        TransportFailure::Status {
            status: 503,
            body: "maintenance".into()
        }
    );
}
