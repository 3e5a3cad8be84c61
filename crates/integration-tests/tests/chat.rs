mod harness;

use axon_core::types::{FunctionDefinition, Message, ModelParameters, Role, Tool};
use axon_core::{ErrorKind, Provider, RequestContext};
use harness::config::ProviderBuilder;
use harness::mock_openai::MockOpenAi;
use serde_json::json;

fn hello() -> Vec<Message> {
    vec![
        Message::text(Role::System, "be brief"),
        Message::text(Role::User, "Hello"),
    ]
}

#[tokio::test]
async fn chat_completion_returns_normalized_response() {
    let mock = MockOpenAi::start().await.unwrap();
    let provider = ProviderBuilder::new(&mock.base_url()).build();

    let response = provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &hello(), None)
        .await
        .unwrap();

    assert_eq!(response.id, "chatcmpl-mock");
    assert_eq!(response.object, "chat.completion");
    assert_eq!(response.model, "gpt-4o-mini");
    assert_eq!(response.system_fingerprint.as_deref(), Some("fp_mock"));
    assert_eq!(response.extra_fields.provider, "openai");
    assert!(response.extra_fields.raw_response.is_none());

    let choice = &response.choices[0];
    assert_eq!(choice.finish_reason.as_deref(), Some("stop"));

    let message = choice.message.as_ref().unwrap();
    assert_eq!(message.content.as_deref(), Some("Hello from mock"));
    assert_eq!(message.thought.as_deref(), Some("thinking it over"));

    let usage = response.usage.unwrap();
    assert_eq!((usage.prompt_tokens, usage.completion_tokens, usage.total_tokens), (10, 5, 15));
}

#[tokio::test]
async fn chat_request_body_matches_wire_format() {
    let mock = MockOpenAi::start().await.unwrap();
    let provider = ProviderBuilder::new(&mock.base_url()).build();

    let params = ModelParameters {
        temperature: Some(0.5),
        max_tokens: Some(64),
        stop_sequences: Some(vec!["END".to_owned()]),
        ..Default::default()
    }
    .with_extra("seed", 7);

    provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &hello(), Some(&params))
        .await
        .unwrap();

    let request = mock.last_request();
    assert_eq!(request.path, "/v1/chat/completions");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("authorization"), Some("Bearer test-key"));
    assert_eq!(
        *request.json(),
        json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "Hello"}
            ],
            "temperature": 0.5,
            "max_tokens": 64,
            "stop": ["END"],
            "seed": 7
        })
    );
}

#[tokio::test]
async fn chat_echoes_params_and_raw_response() {
    let mock = MockOpenAi::start().await.unwrap();
    let provider = ProviderBuilder::new(&mock.base_url()).with_raw_response().build();

    let params = ModelParameters {
        temperature: Some(0.2),
        ..Default::default()
    };

    let response = provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &hello(), Some(&params))
        .await
        .unwrap();

    assert_eq!(response.extra_fields.params, Some(params));

    let raw = response.extra_fields.raw_response.unwrap();
    assert_eq!(raw["id"], "chatcmpl-mock");
    assert_eq!(raw["choices"][0]["message"]["thought"], "thinking it over");
    assert!(raw["choices"][0]["message"].get("reasoning_content").is_none());
}

#[tokio::test]
async fn tool_calls_round_trip() {
    let mock = MockOpenAi::start().await.unwrap();
    let provider = ProviderBuilder::new(&mock.base_url()).build();

    let params = ModelParameters {
        tools: Some(vec![Tool {
            kind: "function".to_owned(),
            function: FunctionDefinition {
                name: "get_weather".to_owned(),
                description: Some("Get current weather".to_owned()),
                parameters: Some(json!({"type": "object", "properties": {"location": {"type": "string"}}})),
            },
        }]),
        ..Default::default()
    };

    let messages = vec![Message::text(Role::User, "What is the weather?")];
    let response = provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &messages, Some(&params))
        .await
        .unwrap();

    let choice = &response.choices[0];
    assert_eq!(choice.finish_reason.as_deref(), Some("tool_calls"));

    let calls = choice.message.as_ref().unwrap().tool_calls.clone().unwrap();
    assert_eq!(calls[0].id.as_deref(), Some("call_test_123"));
    assert_eq!(calls[0].function.name.as_deref(), Some("get_weather"));

    // feed the call and its result back
    let follow_up = vec![
        Message::text(Role::User, "What is the weather?"),
        Message::assistant_tool_calls(calls),
        Message::tool_result("call_test_123", "sunny"),
    ];
    provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &follow_up, None)
        .await
        .unwrap();

    let last = mock.last_request();
    let sent = &last.json()["messages"];
    assert_eq!(sent[1]["role"], "assistant");
    assert_eq!(sent[1]["tool_calls"][0]["id"], "call_test_123");
    assert_eq!(sent[1]["tool_calls"][0]["function"]["name"], "get_weather");
    assert_eq!(sent[2], json!({"role": "tool", "content": "sunny", "tool_call_id": "call_test_123"}));
}

#[tokio::test]
async fn vendor_error_is_classified() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key","param":null}}"#;
    let mock = MockOpenAi::start_failing(401, body).await.unwrap();
    let provider = ProviderBuilder::new(&mock.base_url()).build();

    let err = provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &hello(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Api);
    assert!(err.is_vendor_error());
    assert_eq!(err.status_code, Some(401));
    assert_eq!(err.provider.as_deref(), Some("openai"));
    assert_eq!(err.error.message, "Incorrect API key provided");
    assert_eq!(err.error.kind.as_deref(), Some("invalid_request_error"));
    assert_eq!(err.error.code.as_deref(), Some("invalid_api_key"));
    assert!(err.error.param.is_none());
}

#[tokio::test]
async fn unparseable_error_body_keeps_status() {
    let mock = MockOpenAi::start_failing(502, "<html>bad gateway</html>").await.unwrap();
    let provider = ProviderBuilder::new(&mock.base_url()).build();

    let err = provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &hello(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::EnvelopeDecode);
    assert_eq!(err.status_code, Some(502));
    assert_eq!(err.provider.as_deref(), Some("openai"));
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    let mock = MockOpenAi::start().await.unwrap();
    let base_url = mock.base_url();
    drop(mock);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let provider = ProviderBuilder::new(&base_url).build();
    let err = provider
        .chat_completion(&RequestContext::new(), "gpt-4o-mini", &hello(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Request);
    assert!(err.status_code.is_none());
}
