use std::sync::Arc;
use std::time::Duration;

use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use ai_llm_service::{LlmCollaborator, LlmServiceProfiles};
use report_core::{AiCollaborator, AiError, AnalyticsMetrics, Classifier, Urgency};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ollama_cfg(endpoint: &str, model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: model.into(),
        endpoint: endpoint.into(),
        api_key: None,
        max_tokens: None,
        temperature: Some(0.1),
        top_p: None,
        timeout_secs: Some(5),
    }
}

fn openai_cfg(endpoint: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: "gpt-4o-mini".into(),
        endpoint: endpoint.into(),
        api_key: Some("sk-test".into()),
        max_tokens: None,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(5),
    }
}

fn collaborator(fast: LlmModelConfig, slow: Option<LlmModelConfig>) -> LlmCollaborator {
    let profiles = LlmServiceProfiles::new(fast, slow, Some(2)).unwrap();
    LlmCollaborator::new(Arc::new(profiles))
}

#[tokio::test]
async fn ollama_classification_is_parsed() {
    let server = MockServer::start().await;
    let answer = json!({
        "category": "infrastructure",
        "urgency": "high",
        "entities": { "locations": ["Main Street"], "organizations": [] },
        "confidence": 0.9,
        "analysis": "Road surface damage."
    });
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "qwen-fast",
            "stream": false,
            "format": "json",
            "images": ["AAAA"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": answer.to_string(),
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ai = collaborator(ollama_cfg(&server.uri(), "qwen-fast"), None);
    assert_eq!(ai.name(), "ollama:qwen-fast");

    let result = ai
        .classify("Pothole\n\nHuge pothole on Main Street", Some("data:image/png;base64,AAAA"))
        .await
        .unwrap();
    assert_eq!(result.category, "infrastructure");
    assert_eq!(result.urgency, Urgency::High);
    assert_eq!(result.entities.locations, vec!["Main Street".to_string()]);
}

#[tokio::test]
async fn ollama_server_error_means_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let ai = collaborator(ollama_cfg(&server.uri(), "qwen-fast"), None);
    let err = ai.classify("Leak\n\nWater everywhere", None).await.unwrap_err();
    match err {
        AiError::Unavailable(msg) => assert!(msg.contains("model crashed"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn classifier_falls_back_on_garbage_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "response": "no idea, sorry" })),
        )
        .mount(&server)
        .await;

    let ai: Arc<dyn AiCollaborator> =
        Arc::new(collaborator(ollama_cfg(&server.uri(), "qwen-fast"), None));
    let classifier = Classifier::new(ai, Duration::from_secs(5));
    let out = classifier.classify("Broken light", "Dark street", None).await;
    assert!(!out.classified);
    assert_eq!(out.result.category, "uncategorized");
    assert_eq!(out.result.urgency, Urgency::Medium);
}

#[tokio::test]
async fn slow_profile_writes_insights() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "qwen-slow" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "<think>look at categories</think>Infrastructure dominates. Resolution is slow."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ai = collaborator(
        ollama_cfg(&server.uri(), "qwen-fast"),
        Some(ollama_cfg(&server.uri(), "qwen-slow")),
    );
    let text = ai.summarize(&AnalyticsMetrics::default()).await.unwrap();
    assert_eq!(text, "Infrastructure dominates. Resolution is slow.");
}

#[tokio::test]
async fn openai_chat_completion_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "content": "" } },
                { "message": { "content": "{\"category\":\"utility\",\"urgency\":\"low\"}" } }
            ]
        })))
        .mount(&server)
        .await;

    let ai = collaborator(openai_cfg(&server.uri()), None);
    let result = ai.classify("Flickering power\n\nLights flicker", None).await.unwrap();
    assert_eq!(result.category, "utility");
    assert_eq!(result.urgency, Urgency::Low);
}

#[tokio::test]
async fn openai_empty_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let ai = collaborator(openai_cfg(&server.uri()), None);
    let err = ai.summarize(&AnalyticsMetrics::default()).await.unwrap_err();
    assert!(matches!(err, AiError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn health_reports_missing_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "qwen-fast" }]
        })))
        .mount(&server)
        .await;

    let profiles = LlmServiceProfiles::new(
        ollama_cfg(&server.uri(), "qwen-fast"),
        Some(ollama_cfg(&server.uri(), "qwen-slow")),
        Some(2),
    )
    .unwrap();
    let statuses = profiles.health_all().await;
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].ok);
    assert!(!statuses[1].ok);
    assert!(statuses[1].message.contains("model not found"));
}
