use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{EnrichmentData, VerificationSignal};
use crate::providers::{EnrichmentProvider, VerificationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Client for the Hunter v2 API (email verifier and combined enrichment).
///
/// Authenticates with the `X-API-KEY` header; payloads come back under `data`.
#[derive(Clone)]
pub struct HunterClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HunterClient {
    /// Creates a new `HunterClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API, e.g. `https://api.hunter.io/v2`.
    /// * `api_key` - The Hunter API key.
    /// * `timeout` - Per-request timeout. Requests are never retried.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create Hunter client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.hunter_base_url.clone(),
            config.hunter_api_key.clone(),
            Duration::from_secs(config.provider_timeout_secs),
        )
    }

    /// Verifies an email address.
    ///
    /// https://hunter.io/api-documentation/v2#email-verifier
    pub async fn email_verifier(&self, email: &str) -> Result<Option<VerificationSignal>, AppError> {
        let Some(body) = self.get("/email-verifier", email).await? else {
            return Ok(None);
        };
        let Some(data) = data_section(&body) else {
            return Ok(None);
        };
        // Derived struct deserializers also accept arrays by position
        if !data.is_object() {
            return Err(AppError::ExternalApiError(format!(
                "Hunter verifier data is not an object: {}",
                data
            )));
        }

        let signal: VerificationSignal = serde_json::from_value(data).map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Hunter verifier response: {}", e))
        })?;

        tracing::info!(
            "Hunter: {} verified (disposable: {}, webmail: {}, score: {:?})",
            email,
            signal.disposable,
            signal.webmail,
            signal.score
        );
        Ok(Some(signal))
    }

    /// Fetches person and company data for an email.
    ///
    /// https://hunter.io/api-documentation/v2#combined-enrichment
    pub async fn combined_enrichment(
        &self,
        email: &str,
    ) -> Result<Option<EnrichmentData>, AppError> {
        let Some(body) = self.get("/combined/find", email).await? else {
            return Ok(None);
        };
        let Some(mut data) = data_section(&body) else {
            return Ok(None);
        };

        // `meta` sits next to `data` in the envelope; keep it with the record.
        if let (Some(record), Some(meta)) = (data.as_object_mut(), body.get("meta")) {
            record
                .entry("meta")
                .or_insert_with(|| meta.clone());
        }

        let enrichment = EnrichmentData::new(data);
        if enrichment.is_empty() {
            tracing::info!("Hunter: no person or company found for {}", email);
            return Ok(None);
        }

        tracing::info!(
            "Hunter: enrichment found for {} (person: {}, company: {})",
            email,
            enrichment.person().is_some(),
            enrichment.company().is_some()
        );
        Ok(Some(enrichment))
    }

    /// GETs `path?email=...` and returns the JSON body, or `None` on 404.
    async fn get(&self, path: &str, email: &str) -> Result<Option<Value>, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}{}", self.base_url, path),
            &[("email", email)],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Hunter: GET {}{}?email={}", self.base_url, path, email);

        let response = self
            .client
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(AppError::from)
            .context(format!("Hunter request to {} failed", path))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("Hunter: {} has no record for {}", path, email);
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Hunter API returned status {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Hunter response: {}", e))
        })?;

        Ok(Some(body))
    }
}

fn data_section(body: &Value) -> Option<Value> {
    body.get("data").filter(|d| !d.is_null()).cloned()
}

#[async_trait]
impl VerificationProvider for HunterClient {
    fn name(&self) -> &'static str {
        "hunter_email_verifier"
    }

    async fn verify(&self, email: &str) -> Result<Option<VerificationSignal>, AppError> {
        self.email_verifier(email).await
    }
}

#[async_trait]
impl EnrichmentProvider for HunterClient {
    fn name(&self) -> &'static str {
        "hunter_combined_enrichment"
    }

    async fn enrich(&self, email: &str) -> Result<Option<EnrichmentData>, AppError> {
        self.combined_enrichment(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = HunterClient::new(
            "https://api.hunter.io/v2/".to_string(),
            "key".to_string(),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.hunter.io/v2");
    }

    #[test]
    fn test_data_section() {
        assert_eq!(data_section(&json!({"data": {"score": 1}})), Some(json!({"score": 1})));
        assert_eq!(data_section(&json!({"data": null})), None);
        assert_eq!(data_section(&json!({"errors": []})), None);
    }
}
