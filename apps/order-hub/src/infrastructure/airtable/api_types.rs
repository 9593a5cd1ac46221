//! Airtable Wire Types
//!
//! Request and response bodies for the endpoints this service consumes.
//! Field names follow the provider's camelCase JSON; unknown response
//! fields are ignored.
//!
//! # Endpoints
//!
//! - `GET /v0/{baseId}/{table}?view=...&offset=...` - paginated records
//! - `GET /v0/meta/bases` - base metadata, for name → id resolution
//! - `GET/POST /v0/bases/{baseId}/webhooks` - subscription collection
//! - `DELETE /v0/bases/{baseId}/webhooks/{webhookId}` - one subscription

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Records
// =============================================================================

/// One page of table records.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsPage {
    /// Records on this page, in view order.
    pub records: Vec<ProviderRecord>,
    /// Continuation token; absent or empty on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// One raw record: an id plus a dynamic field map.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRecord {
    /// Provider record identifier.
    pub id: String,
    /// Field name → value map. Empty cells are omitted by the provider.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

// =============================================================================
// Base Metadata
// =============================================================================

/// One page of the base listing.
#[derive(Debug, Clone, Deserialize)]
pub struct BasesPage {
    /// Bases visible to the token.
    pub bases: Vec<ProviderBase>,
    /// Continuation token; absent or empty on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// One base from the metadata API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderBase {
    /// Base identifier, used in record and webhook paths.
    pub id: String,
    /// Human-readable base name.
    pub name: String,
}

// =============================================================================
// Webhooks
// =============================================================================

/// Response to listing a base's webhook subscriptions.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookListResponse {
    /// Currently registered subscriptions.
    pub webhooks: Vec<WebhookInfo>,
}

/// One registered webhook subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookInfo {
    /// Subscription identifier.
    pub id: String,
    /// Delivery target, when reported.
    #[serde(default, rename = "notificationUrl")]
    pub notification_url: Option<String>,
}

/// Body of a webhook creation request.
///
/// # Wire Format
/// ```json
/// {
///   "notificationUrl": "https://example.test/hook",
///   "specification": {"options": {"filters": {"dataTypes": ["tableData"]}}}
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CreateWebhookRequest {
    /// Where the provider should deliver change pings.
    #[serde(rename = "notificationUrl")]
    pub notification_url: String,
    /// What the subscription fires on.
    pub specification: WebhookSpecification,
}

impl CreateWebhookRequest {
    /// Build a creation request for the given target URL and data types.
    #[must_use]
    pub fn new(notification_url: &str, data_types: &[String]) -> Self {
        Self {
            notification_url: notification_url.to_string(),
            specification: WebhookSpecification {
                options: WebhookOptions {
                    filters: WebhookFilters {
                        data_types: data_types.to_vec(),
                    },
                },
            },
        }
    }
}

/// Webhook specification envelope.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookSpecification {
    /// Specification options.
    pub options: WebhookOptions,
}

/// Webhook specification options.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookOptions {
    /// Event filters.
    pub filters: WebhookFilters,
}

/// Webhook event filters.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookFilters {
    /// Provider data types the subscription fires on.
    #[serde(rename = "dataTypes")]
    pub data_types: Vec<String>,
}

/// Response to creating a webhook subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebhookResponse {
    /// Identifier of the new subscription.
    pub id: String,
    /// Provider-side expiry of the subscription, when reported.
    #[serde(default, rename = "expirationTime")]
    pub expiration_time: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Provider error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorDetail,
}

/// Provider error payload: either a structured message or a bare code.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
    /// Structured error with type and message.
    Detailed {
        /// Human-readable error message.
        message: String,
    },
    /// Bare error code string.
    Code(String),
}

impl ApiErrorDetail {
    /// Extract the human-readable message.
    #[must_use]
    pub fn into_message(self) -> String {
        match self {
            Self::Detailed { message } | Self::Code(message) => message,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
