//! Provider Ports (Driven Ports)
//!
//! The two narrow interfaces this service consumes from the external
//! tabular-data provider: a paginated record source and a webhook
//! registrar. Adapters live in the infrastructure layer; the sync
//! orchestrator only ever sees these traits.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::order::{OrderRecord, ValidationError};

// =============================================================================
// Record Source
// =============================================================================

/// One page of decoded records plus the continuation token for the next
/// page, if any.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    /// Records on this page, in provider order.
    pub records: Vec<OrderRecord>,
    /// Continuation token for the next page. `None` terminates pagination.
    pub next_offset: Option<String>,
}

/// Paginated access to the provider's order table.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of records.
    ///
    /// Callers thread `next_offset` from each returned page into the
    /// `offset` of the next call, starting with `None`, until a page comes
    /// back without a token.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport, decode, or record validation
    /// failures. Any error aborts the refresh that issued the fetch.
    async fn fetch_page(
        &self,
        base_id: &str,
        table: &str,
        view: &str,
        offset: Option<&str>,
    ) -> Result<RecordPage, SourceError>;
}

// =============================================================================
// Webhook Registrar
// =============================================================================

/// One change-notification subscription registered with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSubscription {
    /// Provider-assigned subscription identifier.
    pub id: String,
    /// Target URL notifications are delivered to, when reported.
    pub notification_url: Option<String>,
}

/// Filter specification for a webhook subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookFilter {
    /// Provider data types the subscription fires on.
    pub data_types: Vec<String>,
}

impl WebhookFilter {
    /// Filter on table data changes, the only data type this service
    /// subscribes to.
    #[must_use]
    pub fn table_data() -> Self {
        Self {
            data_types: vec!["tableData".to_string()],
        }
    }
}

/// Lifecycle management for change-notification subscriptions.
#[async_trait]
pub trait WebhookRegistrar: Send + Sync {
    /// List the subscriptions currently registered for a base.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport or decode failures; fatal to
    /// the cycle that issued the call.
    async fn list(&self, base_id: &str) -> Result<Vec<WebhookSubscription>, SourceError>;

    /// Create a fresh subscription.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on failure; fatal, since without an active
    /// subscription no future change notifications arrive.
    async fn create(
        &self,
        base_id: &str,
        notification_url: &str,
        filter: &WebhookFilter,
    ) -> Result<WebhookSubscription, SourceError>;

    /// Delete a subscription. Best-effort from the caller's perspective:
    /// provider subscriptions self-expire, so a failed delete is logged
    /// and must not block creating a replacement.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport or provider failures.
    async fn delete(&self, base_id: &str, subscription_id: &str) -> Result<(), SourceError>;
}

// =============================================================================
// Errors
// =============================================================================

/// Failure talking to or decoding from the provider.
#[derive(Debug, Error, Clone)]
pub enum SourceError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A fetched record failed the validating decode.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider returned an error response.
    #[error("provider error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider-supplied error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_data_filter() {
        let filter = WebhookFilter::table_data();
        assert_eq!(filter.data_types, vec!["tableData".to_string()]);
    }

    #[test]
    fn validation_error_converts_to_source_error() {
        let err = ValidationError::MissingField {
            record_id: "rec1".to_string(),
            field: "price",
        };
        let source: SourceError = err.into();
        assert!(matches!(source, SourceError::Validation(_)));
    }
}
