//! Result-search collaborator.
//!
//! Synchronous contract: a query string in, a ranked result set out within a
//! bounded timeout. The payload shape mirrors the upstream provider: organic
//! entries plus related questions and related searches.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// One ranked search entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
    pub position: usize,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A full result set for one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub organic: Vec<SearchEntry>,
    pub related_questions: Vec<String>,
    pub related_searches: Vec<String>,
}

/// The search collaborator contract.
#[async_trait]
pub trait ResultSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResults, SearchError>;
}

/// HTTP client for a SERP-style search API.
pub struct HttpSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    timeout: Duration,
}

impl HttpSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl ResultSearch for HttpSearchClient {
    async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query), ("api_key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(self.timeout)
                } else {
                    SearchError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus(status.as_u16()));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidPayload(e.to_string()))?;

        parse_payload(&payload)
    }
}

/// Parse a SERP-style payload into the collaborator's result shape.
fn parse_payload(payload: &serde_json::Value) -> Result<SearchResults, SearchError> {
    let organic = payload
        .get("organic_results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| SearchError::InvalidPayload("missing organic_results".into()))?
        .iter()
        .enumerate()
        .map(|(i, entry)| SearchEntry {
            position: entry
                .get("position")
                .and_then(|v| v.as_u64())
                .map(|p| p as usize)
                .unwrap_or(i + 1),
            title: str_field(entry, "title"),
            url: str_field(entry, "link"),
            snippet: str_field(entry, "snippet"),
        })
        .collect();

    let related_questions = string_list(payload, "related_questions", "question");
    let related_searches = string_list(payload, "related_searches", "query");

    Ok(SearchResults {
        organic,
        related_questions,
        related_searches,
    })
}

fn str_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn string_list(payload: &serde_json::Value, key: &str, field: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get(field).and_then(|v| v.as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
