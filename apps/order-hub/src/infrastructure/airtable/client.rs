//! Airtable REST Client
//!
//! Implements the [`RecordSource`] and [`WebhookRegistrar`] ports over the
//! provider's HTTP API, plus base-name resolution against the metadata
//! endpoint. Requests carry bearer-token auth and a fixed timeout; there is
//! no in-request retrying - a failed call fails the cycle that issued it,
//! and the next external trigger starts fresh.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::api_types::{
    ApiErrorResponse, BasesPage, CreateWebhookRequest, CreateWebhookResponse, RecordsPage,
    WebhookListResponse,
};
use super::error::AirtableError;
use crate::application::ports::{
    RecordPage, RecordSource, SourceError, WebhookFilter, WebhookRegistrar, WebhookSubscription,
};
use crate::domain::order::OrderRecord;

/// Production API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.airtable.com";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Airtable API.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: Client,
    api_token: String,
    base_url: String,
}

impl AirtableClient {
    /// Create a client for the production endpoint.
    ///
    /// An empty token is accepted here; it surfaces as authentication
    /// failures on the first provider call instead.
    ///
    /// # Errors
    ///
    /// Returns [`AirtableError::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(api_token: impl Into<String>) -> Result<Self, AirtableError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AirtableError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve a base name to its identifier via the metadata API.
    ///
    /// # Errors
    ///
    /// Returns [`AirtableError::BaseNotFound`] when no visible base carries
    /// the name, or the underlying transport/decode error.
    pub async fn resolve_base_id(&self, base_name: &str) -> Result<String, AirtableError> {
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.http.get(format!("{}/v0/meta/bases", self.base_url));
            if let Some(o) = &offset {
                request = request.query(&[("offset", o)]);
            }

            let page: BasesPage = self.send(request).await?;
            if let Some(base) = page.bases.into_iter().find(|b| b.name == base_name) {
                return Ok(base.id);
            }

            match page.offset.filter(|o| !o.is_empty()) {
                Some(next) => offset = Some(next),
                None => {
                    return Err(AirtableError::BaseNotFound {
                        name: base_name.to_string(),
                    });
                }
            }
        }
    }

    /// Send a request with auth attached and decode the JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AirtableError> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| AirtableError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AirtableError::Transport(e.to_string()))?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(AirtableError::AuthenticationFailed);
            }
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.into_message());
            return Err(AirtableError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.is_empty() {
            // Some endpoints (webhook delete) return an empty body on success.
            return serde_json::from_str("null").map_err(|e| AirtableError::Decode(e.to_string()));
        }
        serde_json::from_str(&body).map_err(|e| AirtableError::Decode(e.to_string()))
    }

    fn webhooks_url(&self, base_id: &str) -> String {
        format!("{}/v0/bases/{}/webhooks", self.base_url, base_id)
    }
}

// =============================================================================
// Port Implementations
// =============================================================================

#[async_trait]
impl RecordSource for AirtableClient {
    async fn fetch_page(
        &self,
        base_id: &str,
        table: &str,
        view: &str,
        offset: Option<&str>,
    ) -> Result<RecordPage, SourceError> {
        let mut request = self
            .http
            .get(format!("{}/v0/{}/{}", self.base_url, base_id, table))
            .query(&[("view", view)]);
        if let Some(o) = offset {
            request = request.query(&[("offset", o)]);
        }

        let page: RecordsPage = self.send(request).await.map_err(SourceError::from)?;

        let records = page
            .records
            .iter()
            .map(|r| OrderRecord::from_fields(&r.id, &r.fields))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecordPage {
            records,
            next_offset: page.offset.filter(|o| !o.is_empty()),
        })
    }
}

#[async_trait]
impl WebhookRegistrar for AirtableClient {
    async fn list(&self, base_id: &str) -> Result<Vec<WebhookSubscription>, SourceError> {
        let request = self.http.get(self.webhooks_url(base_id));
        let response: WebhookListResponse = self.send(request).await.map_err(SourceError::from)?;

        Ok(response
            .webhooks
            .into_iter()
            .map(|w| WebhookSubscription {
                id: w.id,
                notification_url: w.notification_url,
            })
            .collect())
    }

    async fn create(
        &self,
        base_id: &str,
        notification_url: &str,
        filter: &WebhookFilter,
    ) -> Result<WebhookSubscription, SourceError> {
        let body = CreateWebhookRequest::new(notification_url, &filter.data_types);
        let request = self.http.post(self.webhooks_url(base_id)).json(&body);
        let response: CreateWebhookResponse =
            self.send(request).await.map_err(SourceError::from)?;
        tracing::debug!(
            subscription_id = %response.id,
            expires = ?response.expiration_time,
            "created webhook subscription"
        );

        Ok(WebhookSubscription {
            id: response.id,
            notification_url: Some(notification_url.to_string()),
        })
    }

    async fn delete(&self, base_id: &str, subscription_id: &str) -> Result<(), SourceError> {
        let request = self
            .http
            .delete(format!("{}/{}", self.webhooks_url(base_id), subscription_id));
        let _: serde_json::Value = self.send(request).await.map_err(SourceError::from)?;
        Ok(())
    }
}
