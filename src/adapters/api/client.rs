//! HTTP client for the hospital records API

use super::models::ApiEnvelope;
use super::RecordSource;
use crate::config::ApiConfig;
use crate::domain::{ApiError, HmsExportError, PatientId, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Records API client
///
/// Issues single-page GET requests sized by `page_size`. There is no retry;
/// a failed request surfaces as an [`ApiError`].
pub struct ApiClient {
    base_url: String,
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hms_export::adapters::api::ApiClient;
    /// use hms_export::config::ApiConfig;
    ///
    /// let client = ApiClient::new(ApiConfig::default()).expect("client");
    /// assert_eq!(client.base_url(), "http://localhost:3000/api");
    /// ```
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| {
                HmsExportError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.config
            .token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) if !token.expose_secret().is_empty() => {
                request.bearer_auth(token.expose_secret().as_str())
            }
            _ => request,
        }
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            HmsExportError::Configuration(format!("Invalid api.base_url '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                HmsExportError::Configuration(format!(
                    "api.base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_items(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Vec<Value>> {
        let url = self.endpoint(segments)?;

        tracing::debug!(url = %url, "Requesting records API");

        let request = self.authorize(self.client.get(url.clone()).query(query));
        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(format!(
                    "{url} did not answer within {}s",
                    self.config.timeout_seconds
                ))
            } else {
                ApiError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = resp.status();
        match status {
            s if s.is_success() => {
                let envelope: ApiEnvelope = resp
                    .json()
                    .await
                    .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
                let pagination = envelope.pagination;
                let items = envelope.into_items()?;
                if pagination.is_some_and(|p| p.total > items.len() as u64) {
                    tracing::warn!(
                        url = %url,
                        received = items.len(),
                        total = pagination.map(|p| p.total),
                        "Records API returned a partial page; raise api.page_size to export everything"
                    );
                }
                Ok(items)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(url.to_string()).into()),
            s => {
                let body = resp.text().await.unwrap_or_default();
                let message = error_message(&body);
                if s.is_server_error() {
                    Err(ApiError::ServerError {
                        status: s.as_u16(),
                        message,
                    }
                    .into())
                } else {
                    Err(ApiError::ClientError {
                        status: s.as_u16(),
                        message,
                    }
                    .into())
                }
            }
        }
    }
}

/// The backend's `{ "message": ... }` body, or the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn fetch_timeline(&self, patient_id: &PatientId) -> Result<Vec<Value>> {
        let items = self
            .get_items(
                &["medical-records", "patient", patient_id.as_str(), "timeline"],
                &[
                    ("page", "1".to_string()),
                    ("limit", self.config.page_size.to_string()),
                ],
            )
            .await?;

        tracing::info!(
            patient_id = %patient_id,
            count = items.len(),
            "Fetched patient timeline"
        );
        Ok(items)
    }

    async fn fetch_appointments(&self, date: Option<NaiveDate>) -> Result<Vec<Value>> {
        let mut query = vec![
            ("page", "1".to_string()),
            ("limit", self.config.page_size.to_string()),
        ];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }

        let items = self.get_items(&["appointments"], &query).await?;

        tracing::info!(
            date = ?date,
            count = items.len(),
            "Fetched appointments"
        );
        Ok(items)
    }

    fn describe(&self) -> String {
        format!("records API at {}", self.base_url)
    }
}
