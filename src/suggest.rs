//! Suggestion providers: where fill values come from when the caller does
//! not supply one.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::errors::EngineError;
use crate::types::{Suggestion, SuggestionOrigin, SuggestionQuery};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Confidence attached to type-keyed default values
const FALLBACK_CONFIDENCE: f64 = 0.2;

/// A source of fill values for a scored field.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Short name used in logs and reconfiguration checks
    fn kind(&self) -> &'static str;

    /// Strict lookup; transport and decode failures surface as errors.
    async fn lookup(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>, EngineError>;

    /// Resilient lookup used by fill flows: any failure or empty answer
    /// degrades to the static type-keyed defaults.
    async fn suggest(&self, query: &SuggestionQuery) -> Vec<Suggestion> {
        match self.lookup(query).await {
            Ok(suggestions) if !suggestions.is_empty() => suggestions,
            Ok(_) => fallback_suggestions(query),
            Err(err) => {
                warn!("Suggestion lookup failed, using fallback: {}", err);
                fallback_suggestions(query)
            }
        }
    }
}

/// Assemble the provider request for a field: search text built from the
/// title, the placeholder and type-specific keywords.
pub fn build_query(
    title: &str,
    field_type: Option<&str>,
    placeholder: Option<&str>,
    instructions: Option<&str>,
) -> SuggestionQuery {
    let mut parts = vec![title.to_string()];
    if let Some(p) = placeholder.filter(|p| !p.is_empty()) {
        parts.push(p.to_string());
    }
    if let Some(keywords) = field_type.and_then(type_keywords) {
        parts.push(keywords.to_string());
    }
    SuggestionQuery {
        search_query: parts.join(" "),
        field_title: title.to_string(),
        field_type: field_type.map(str::to_string),
        placeholder: placeholder.map(str::to_string),
        instructions: instructions.map(str::to_string),
    }
}

fn type_keywords(field_type: &str) -> Option<&'static str> {
    match field_type {
        "email" => Some("email address"),
        "tel" => Some("phone number"),
        "url" => Some("website url"),
        "date" => Some("date"),
        "number" => Some("numeric value"),
        "password" => Some("password"),
        _ => None,
    }
}

/// Deterministic type-keyed defaults, one suggestion per query
pub fn fallback_suggestions(query: &SuggestionQuery) -> Vec<Suggestion> {
    let value = match query.field_type.as_deref() {
        Some("checkbox") => "true".to_string(),
        Some("number") => "42".to_string(),
        Some("email") => "user@example.com".to_string(),
        Some("tel") => "+1-555-0123".to_string(),
        Some("url") => "https://example.com".to_string(),
        Some("date") => "2025-07-26".to_string(),
        _ => format!("Sample {}", query.field_title),
    };
    vec![Suggestion {
        value,
        source: SuggestionOrigin::Fallback,
        confidence: FALLBACK_CONFIDENCE,
    }]
}

/// Provider with no backing service; answers with the static defaults
#[derive(Default)]
pub struct StaticProvider;

#[async_trait]
impl SuggestionProvider for StaticProvider {
    fn kind(&self) -> &'static str {
        "static"
    }

    async fn lookup(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>, EngineError> {
        Ok(fallback_suggestions(query))
    }
}

#[derive(Debug, Deserialize)]
struct EndpointResponse {
    suggestions: Vec<Suggestion>,
}

/// Provider backed by an HTTP endpoint speaking JSON, with an optional
/// bearer credential
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpProvider {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build suggestion HTTP client")?;
        Ok(HttpProvider {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl SuggestionProvider for HttpProvider {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn lookup(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>, EngineError> {
        let mut request = self.client.post(&self.endpoint).json(query);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            EngineError::SuggestionFailed(format!("request to {} failed: {err}", self.endpoint))
        })?;
        if !response.status().is_success() {
            return Err(EngineError::SuggestionFailed(format!(
                "endpoint returned {}",
                response.status()
            )));
        }
        let decoded: EndpointResponse = response
            .json()
            .await
            .map_err(|err| EngineError::SuggestionFailed(format!("invalid response: {err}")))?;
        Ok(decoded.suggestions)
    }
}

#[cfg(test)]
#[path = "suggest_test.rs"]
mod suggest_test;
