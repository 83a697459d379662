// Tests for the HTTP suggestion provider against a local axum endpoint.

use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::{Router, routing::post};
use serde_json::{Value, json};

use formprobe::suggest::{HttpProvider, build_query};
use formprobe::types::SuggestionOrigin;
use formprobe::{EngineError, SuggestionProvider};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{addr}/suggest")
}

async fn canned() -> Json<Value> {
    Json(json!({
        "suggestions": [
            {"value": "Ada Lovelace", "source": "knowledge_base", "confidence": 0.92},
            {"value": "Grace Hopper", "source": "generative", "confidence": 0.4}
        ]
    }))
}

async fn failing() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn empty() -> Json<Value> {
    Json(json!({ "suggestions": [] }))
}

async fn guarded(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "Bearer sk-test")
        .unwrap_or(false);
    if authorized {
        (
            StatusCode::OK,
            Json(json!({
                "suggestions": [
                    {"value": "ada@example.com", "source": "knowledge_base", "confidence": 0.9}
                ]
            })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "suggestions": [] })))
    }
}

#[tokio::test]
async fn test_endpoint_suggestions_come_back_ranked() {
    let endpoint = serve(Router::new().route("/suggest", post(canned))).await;
    let provider = HttpProvider::new(endpoint, None).unwrap();

    let query = build_query("Full name", Some("text"), None, None);
    let suggestions = provider.lookup(&query).await.unwrap();

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].value, "Ada Lovelace");
    assert_eq!(suggestions[0].source, SuggestionOrigin::KnowledgeBase);
    assert_eq!(suggestions[0].confidence, 0.92);
    assert_eq!(suggestions[1].source, SuggestionOrigin::Generative);
}

#[tokio::test]
async fn test_server_error_surfaces_from_strict_lookup() {
    let endpoint = serve(Router::new().route("/suggest", post(failing))).await;
    let provider = HttpProvider::new(endpoint, None).unwrap();

    let query = build_query("Email address", Some("email"), None, None);
    let err = provider.lookup(&query).await.unwrap_err();

    assert!(matches!(err, EngineError::SuggestionFailed(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_fill_path_degrades_to_static_defaults() {
    let endpoint = serve(Router::new().route("/suggest", post(failing))).await;
    let provider = HttpProvider::new(endpoint, None).unwrap();

    // The resilient path never errors; a dead endpoint yields the
    // type-keyed default instead.
    let query = build_query("Email address", Some("email"), None, None);
    let suggestions = provider.suggest(&query).await;

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].value, "user@example.com");
    assert_eq!(suggestions[0].source, SuggestionOrigin::Fallback);
}

#[tokio::test]
async fn test_empty_answer_falls_back_too() {
    let endpoint = serve(Router::new().route("/suggest", post(empty))).await;
    let provider = HttpProvider::new(endpoint, None).unwrap();

    let query = build_query("Nickname", None, None, None);
    let suggestions = provider.suggest(&query).await;

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].value, "Sample Nickname");
    assert_eq!(suggestions[0].source, SuggestionOrigin::Fallback);
}

#[tokio::test]
async fn test_api_key_travels_as_bearer_credential() {
    let endpoint = serve(Router::new().route("/suggest", post(guarded))).await;

    let keyed = HttpProvider::new(endpoint.clone(), Some("sk-test".to_string())).unwrap();
    let query = build_query("Email address", Some("email"), None, None);
    let suggestions = keyed.lookup(&query).await.unwrap();
    assert_eq!(suggestions[0].value, "ada@example.com");

    let anonymous = HttpProvider::new(endpoint, None).unwrap();
    let err = anonymous.lookup(&query).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
