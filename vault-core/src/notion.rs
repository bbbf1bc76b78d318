//! Note-storage adapter — serializes an analysis record into a page
//! creation request against a Notion-style API.
//!
//! One POST per save, bearer-token authenticated, explicit 30s timeout,
//! no retries. Any non-success response or transport failure is a typed
//! error the caller surfaces; the local log is unaffected either way.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::models::AnalysisRecord;

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// API revision header required by the service.
const NOTION_VERSION: &str = "2022-06-28";

/// Page titles are capped at this many characters of the query.
pub const TITLE_CHARS: usize = 50;

/// Note-storage adapter errors
#[derive(Error, Debug)]
pub enum NotionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key — set NOTION_API_KEY in the environment")]
    MissingApiKey,
}

/// Note-storage client configuration
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: String,
    pub database_id: String,
}

impl NotionConfig {
    pub fn new(api_key: Option<String>, database_id: String) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("NOTION_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            database_id,
        }
    }
}

/// Client for the remote note-storage service.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    config: NotionConfig,
    base_url: String,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self, NotionError> {
        Self::with_base_url(config, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(config: NotionConfig, base_url: String) -> Result<Self, NotionError> {
        if config.api_key.is_empty() {
            return Err(NotionError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create one page for the record in the destination database.
    pub async fn create_page(&self, record: &AnalysisRecord) -> Result<(), NotionError> {
        let url = format!("{}/pages", self.base_url);
        let title: String = record.query.chars().take(TITLE_CHARS).collect();

        let body = json!({
            "parent": { "database_id": self.config.database_id },
            "properties": {
                "Title": { "title": [ { "text": { "content": title } } ] },
                "Subject": { "select": { "name": record.subject.to_string() } },
                "Summary": { "rich_text": [ { "text": { "content": record.summary } } ] },
                "Deep Dive": { "rich_text": [ { "text": { "content": record.deep_dive } } ] },
                "Sources": { "url": record.sources },
                "Created At": { "date": { "start": record.timestamp.to_rfc3339() } }
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(code = status.as_u16(), message = %message, "Note-storage API error");
            return Err(NotionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        tracing::info!(database_id = %self.config.database_id, "Saved record to note storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_key: &str) -> NotionConfig {
        NotionConfig {
            api_key: api_key.to_string(),
            database_id: "2aed872b-594c-8085-b6f7-0037b9546e1c".to_string(),
        }
    }

    fn test_record(query: &str) -> AnalysisRecord {
        AnalysisRecord {
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            subject: Category::Science,
            query: query.to_string(),
            summary: "Plants convert light energy into chemical energy.".to_string(),
            deep_dive: "Topic: Photosynthesis".to_string(),
            sources: "https://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_page_posts_typed_properties() {
        let mock_server = MockServer::start().await;
        let client =
            NotionClient::with_base_url(test_config("secret-token"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("Notion-Version", NOTION_VERSION))
            .and(body_partial_json(serde_json::json!({
                "parent": { "database_id": "2aed872b-594c-8085-b6f7-0037b9546e1c" },
                "properties": {
                    "Subject": { "select": { "name": "Science" } },
                    "Sources": { "url": "https://example.com" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "page", "id": "abc123"
            })))
            .mount(&mock_server)
            .await;

        client
            .create_page(&test_record("Explain photosynthesis"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_title_is_truncated_to_50_chars() {
        let mock_server = MockServer::start().await;
        let client =
            NotionClient::with_base_url(test_config("secret-token"), mock_server.uri()).unwrap();

        let long_query = "Q".repeat(120);
        let expected_title = "Q".repeat(TITLE_CHARS);

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "properties": {
                    "Title": { "title": [ { "text": { "content": expected_title } } ] }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        client.create_page(&test_record(&long_query)).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_is_a_typed_error_without_retry() {
        let mock_server = MockServer::start().await;
        let client =
            NotionClient::with_base_url(test_config("secret-token"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .expect(1) // exactly one attempt — the adapter never retries
            .mount(&mock_server)
            .await;

        let err = client.create_page(&test_record("q")).await.unwrap_err();
        match err {
            NotionError::Api { code, message } => {
                assert_eq!(code, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_api_key_fails_construction() {
        let result = NotionClient::new(test_config(""));
        assert!(matches!(result, Err(NotionError::MissingApiKey)));
    }
}
