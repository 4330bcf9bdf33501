//! HTTP adapter behaviour against mocked OpenAI and Gemini endpoints.

use std::sync::Arc;
use std::time::Duration;

use cover_letter::llm_client::{
    GeminiModelCatalog, GeminiProvider, ModelResolver, OpenAiProvider, RetryPolicy,
    StaticModelResolver,
};
use cover_letter::{
    CompletionRequest, GenerationRequest, LlmProvider, Orchestrator, ParsePolicy, ProviderError,
    ProviderKind, SenderProfile, Stage,
};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPENAI_KEY: &str = "sk-test-0123456789abcdefghij";
const GEMINI_KEY: &str = "AIzaSyA-bcdefghijklmnop_qrstuvwxyz12";

fn request(model: &str, json: bool) -> CompletionRequest<'_> {
    CompletionRequest {
        system: "You are a recruiter.",
        prompt: "Job description goes here.",
        model,
        json,
    }
}

fn generation_request() -> GenerationRequest {
    GenerationRequest {
        resume_text: "5 years Python backend experience".to_string(),
        job_description: "We are hiring a backend engineer with Python and SQL. ".repeat(3),
        sender: SenderProfile::default(),
        date: "June 02, 2025".to_string(),
        provider: ProviderKind::OpenAi,
        model: "gpt-4o".to_string(),
        credential: OPENAI_KEY.to_string(),
    }
}

fn openai(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new(Client::new(), &server.uri(), OPENAI_KEY, 60)
}

fn chat_reply(content: &str, total_tokens: u64) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": total_tokens }
    })
}

fn error_body(message: &str, code: &str) -> serde_json::Value {
    json!({ "error": { "message": message, "type": "error", "code": code } })
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_openai_structured_call_requests_json_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {OPENAI_KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_reply(r#"{"company":"Acme"}"#, 77)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = openai(&server);
    let completion = provider.complete(request("gpt-4o", true)).await.unwrap();

    assert_eq!(completion.text, r#"{"company":"Acme"}"#);
    assert_eq!(completion.usage.total_tokens, 77);
    assert_eq!(completion.usage.output_chars, 18);
    assert!(completion.usage.input_chars > 0);
    assert_eq!(provider.parse_policy(), ParsePolicy::Abort);
}

#[tokio::test]
async fn test_openai_free_text_call_omits_response_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Dear Jane,", 3)))
        .mount(&server)
        .await;

    let completion = openai(&server)
        .complete(request("gpt-4o-mini", false))
        .await
        .unwrap();
    assert_eq!(completion.text, "Dear Jane,");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("response_format").is_none());
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Job description goes here.");
}

#[tokio::test]
async fn test_openai_rejected_key_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(error_body("Incorrect API key provided", "invalid_api_key")),
        )
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(request("gpt-4o", false))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::AuthError);
    assert!(!err.to_string().contains(OPENAI_KEY));
}

#[tokio::test]
async fn test_openai_exhausted_quota_is_not_a_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(error_body("You exceeded your current quota", "insufficient_quota")),
        )
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(request("gpt-4o", false))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::QuotaExceeded);
}

#[tokio::test]
async fn test_openai_throttling_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(error_body("Rate limit reached for requests", "rate_limit_exceeded")),
        )
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(request("gpt-4o", false))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::RateLimited);
}

#[tokio::test]
async fn test_openai_empty_choices_is_an_empty_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let completion = openai(&server)
        .complete(request("gpt-4o", false))
        .await
        .unwrap();
    assert!(completion.text.is_empty());
    assert_eq!(completion.usage.total_tokens, 0);
}

#[tokio::test]
async fn test_empty_openai_reply_fails_stage_but_keeps_its_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "" } }],
            "usage": { "total_tokens": 50 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(Duration::from_secs(60), RetryPolicy::disabled());
    let envelope = orchestrator
        .run(&openai(&server), &generation_request())
        .await;

    assert!(!envelope.ok);
    assert_eq!(envelope.stage, Some(Stage::Extraction));
    assert_eq!(
        envelope.error.as_deref(),
        Some("Step 1 (Extraction): the model returned an empty response")
    );
    assert_eq!(envelope.usage.total_tokens, 50);
    assert!(envelope.usage.input_chars > 0);
    assert_eq!(envelope.usage.output_chars, 0);
}

#[tokio::test]
async fn test_openai_server_error_is_unclassified_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(request("gpt-4o", false))
        .await
        .unwrap_err();
    match err {
        ProviderError::Unclassified(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("expected Unclassified, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_connection_error() {
    let provider = OpenAiProvider::new(Client::new(), "http://127.0.0.1:9", OPENAI_KEY, 60);
    let err = provider
        .complete(request("gpt-4o", false))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Connection(_)));
    assert!(err.is_transient());
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini
// ────────────────────────────────────────────────────────────────────────────

fn model_list(names: &[(&str, &[&str])], next_page: Option<&str>) -> serde_json::Value {
    let models: Vec<_> = names
        .iter()
        .map(|(name, methods)| {
            json!({ "name": format!("models/{name}"), "supportedGenerationMethods": methods })
        })
        .collect();
    match next_page {
        Some(token) => json!({ "models": models, "nextPageToken": token }),
        None => json!({ "models": models }),
    }
}

fn generate_reply(text: &str, total_tokens: u64) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }],
        "usageMetadata": { "promptTokenCount": 12, "totalTokenCount": total_tokens }
    })
}

#[tokio::test]
async fn test_gemini_catalog_follows_pages_and_filters_methods() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(
            &[("gemini-1.5-pro", &["generateContent", "countTokens"][..])],
            None,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(header("x-goog-api-key", GEMINI_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(
            &[
                ("gemini-2.0-flash", &["generateContent"][..]),
                ("text-embedding-004", &["embedContent"][..]),
            ],
            Some("page-2"),
        )))
        .mount(&server)
        .await;

    let catalog = GeminiModelCatalog::new(Client::new(), &server.uri(), GEMINI_KEY, 60);
    let models = catalog.list_generative_models().await.unwrap();
    assert_eq!(models, vec!["gemini-2.0-flash", "gemini-1.5-pro"]);
}

#[tokio::test]
async fn test_gemini_retired_model_resolves_to_available_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(
            &[
                ("gemini-1.5-pro", &["generateContent"][..]),
                ("gemini-2.0-flash", &["generateContent"][..]),
            ],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", GEMINI_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_reply("Dear Jane,", 42)))
        .expect(2)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(Client::new(), &server.uri(), GEMINI_KEY, 60);
    let first = provider.complete(request("gemini-1.0-ultra", false)).await.unwrap();
    let second = provider.complete(request("gemini-1.0-ultra", false)).await.unwrap();

    assert_eq!(first.text, "Dear Jane,");
    assert_eq!(first.usage.total_tokens, 42);
    assert_eq!(second.text, first.text);
    assert_eq!(provider.parse_policy(), ParsePolicy::Placeholders);
}

#[tokio::test]
async fn test_gemini_structured_call_appends_json_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generate_reply(r#"{"company":"Acme"}"#, 9)),
        )
        .mount(&server)
        .await;

    let resolver: Arc<dyn ModelResolver> = Arc::new(StaticModelResolver::new("gemini-1.5-flash"));
    let provider =
        GeminiProvider::with_resolver(Client::new(), &server.uri(), GEMINI_KEY, 60, resolver);
    provider.complete(request("gemini-1.5-flash", true)).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.starts_with("Job description goes here."));
    assert!(prompt.contains("JSON"));
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        "You are a recruiter."
    );
    assert!(!received[0].url.as_str().contains(GEMINI_KEY));
}

#[tokio::test]
async fn test_gemini_blocked_reply_is_empty_with_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" },
            "usageMetadata": { "promptTokenCount": 8, "totalTokenCount": 8 }
        })))
        .mount(&server)
        .await;

    let resolver: Arc<dyn ModelResolver> = Arc::new(StaticModelResolver::new("gemini-1.5-flash"));
    let provider =
        GeminiProvider::with_resolver(Client::new(), &server.uri(), GEMINI_KEY, 60, resolver);
    let completion = provider
        .complete(request("gemini-1.5-flash", false))
        .await
        .unwrap();
    assert!(completion.text.is_empty());
    assert_eq!(completion.usage.total_tokens, 8);

    let mut req = generation_request();
    req.provider = ProviderKind::Gemini;
    req.model = "gemini-1.5-flash".to_string();
    let envelope = Orchestrator::new(Duration::from_secs(60), RetryPolicy::disabled())
        .run(&provider, &req)
        .await;
    assert!(!envelope.ok);
    assert_eq!(envelope.stage, Some(Stage::Extraction));
    assert_eq!(envelope.usage.total_tokens, 8);
}

#[tokio::test]
async fn test_gemini_invalid_key_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(Client::new(), &server.uri(), GEMINI_KEY, 60);
    let err = provider
        .complete(request("gemini-1.5-flash", false))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::AuthError);
}

#[tokio::test]
async fn test_gemini_catalog_without_generative_models_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(
            &[("text-embedding-004", &["embedContent"][..])],
            None,
        )))
        .mount(&server)
        .await;

    let catalog = GeminiModelCatalog::new(Client::new(), &server.uri(), GEMINI_KEY, 60);
    let err = catalog.resolve("gemini-1.5-flash").await.unwrap_err();
    assert!(matches!(err, ProviderError::Unclassified(_)));
}
