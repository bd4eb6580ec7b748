//! HTTP client for the rules read endpoint.

use async_trait::async_trait;
use fieldrules_core::validation::rules::{rule_map_from_json, RuleMap};
use serde::Deserialize;
use serde_json::Value;

use crate::config::LoaderConfig;
use crate::error::FetchError;

/// Something that can produce the stored rules of a schema.
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch_rules(&self, schema_id: &str) -> Result<RuleMap, FetchError>;
}

/// Body of `GET /api/v1/rules`.
#[derive(Debug, Deserialize)]
struct RulesEnvelope {
    success: bool,
    #[serde(default)]
    rules: Value,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the rules service.
pub struct RulesApi {
    client: reqwest::Client,
    api_url: String,
}

impl RulesApi {
    /// Create a client whose every request is bounded by the configured
    /// fetch timeout.
    pub fn new(config: &LoaderConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`FetchError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RuleSource for RulesApi {
    /// Sends `GET /api/v1/rules?schemaId=<id>`.
    async fn fetch_rules(&self, schema_id: &str) -> Result<RuleMap, FetchError> {
        let response = self
            .client
            .get(format!("{}/api/v1/rules", self.api_url))
            .query(&[("schemaId", schema_id)])
            .send()
            .await?;

        let envelope: RulesEnvelope = Self::ensure_success(response).await?.json().await?;
        if !envelope.success {
            return Err(FetchError::Rejected(
                envelope.message.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }

        match envelope.rules {
            // Some hosts encode an empty map as `[]`.
            Value::Null => Ok(RuleMap::new()),
            Value::Array(items) if items.is_empty() => Ok(RuleMap::new()),
            rules => Ok(rule_map_from_json(&rules)?),
        }
    }
}
