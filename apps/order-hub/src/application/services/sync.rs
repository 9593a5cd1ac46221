//! Sync Orchestrator
//!
//! Runs one refresh cycle at a time: rotate the provider webhook
//! subscription, fetch the full record set page by page, install it as the
//! new snapshot in one atomic swap, and notify subscribers. A failed cycle
//! leaves the previous snapshot untouched and is retried only on the next
//! trigger (startup or webhook ping); there are no in-cycle retries.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::application::ports::{RecordSource, SourceError, WebhookFilter, WebhookRegistrar};
use crate::domain::order::OrderRecord;
use crate::infrastructure::notify::NotificationHub;
use crate::infrastructure::snapshot::SnapshotStore;

/// Upper bound on pages fetched in one refresh, guarding against a
/// misbehaving provider returning a non-terminating offset cycle.
const MAX_PAGES: usize = 10_000;

// =============================================================================
// Configuration
// =============================================================================

/// Provider coordinates for the sync cycle.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Resolved provider base identifier.
    pub base_id: String,
    /// Table to mirror.
    pub table_name: String,
    /// View records are fetched from.
    pub view_name: String,
    /// URL the provider delivers change notifications to.
    pub notification_url: String,
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records installed in the new snapshot.
    pub records: usize,
    /// Subscribers the refresh notice reached.
    pub subscribers_notified: usize,
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates webhook rotation, full refresh, and subscriber fan-out.
pub struct SyncService {
    source: Arc<dyn RecordSource>,
    registrar: Arc<dyn WebhookRegistrar>,
    snapshot: Arc<SnapshotStore>,
    hub: Arc<NotificationHub>,
    config: SyncConfig,
    /// Serializes cycles: overlapping triggers queue here instead of racing
    /// on partial fetches.
    cycle: Mutex<()>,
}

impl SyncService {
    /// Create a new sync service.
    #[must_use]
    pub fn new(
        source: Arc<dyn RecordSource>,
        registrar: Arc<dyn WebhookRegistrar>,
        snapshot: Arc<SnapshotStore>,
        hub: Arc<NotificationHub>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            registrar,
            snapshot,
            hub,
            config,
            cycle: Mutex::new(()),
        }
    }

    /// Run one full cycle: rotate the webhook, refresh the snapshot,
    /// broadcast a refresh notice.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if webhook creation or any page fetch fails.
    /// On error the previously installed snapshot remains in place and no
    /// notice is broadcast.
    pub async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        let _guard = self.cycle.lock().await;

        self.rotate_webhook().await?;

        let records = self.fetch_all().await?;
        let count = records.len();
        self.snapshot.replace(records);

        let subscribers_notified = self.hub.notify().unwrap_or(0);
        tracing::info!(
            records = count,
            subscribers = subscribers_notified,
            "snapshot refreshed"
        );

        Ok(SyncReport {
            records: count,
            subscribers_notified,
        })
    }

    /// Delete every listed subscription, then create a fresh one.
    ///
    /// Provider subscriptions expire after roughly a week, so rotation is
    /// unconditional rather than gated on expiry. Delete failures are
    /// logged and skipped; the create must succeed.
    async fn rotate_webhook(&self) -> Result<(), SyncError> {
        let base_id = &self.config.base_id;

        let existing = self
            .registrar
            .list(base_id)
            .await
            .map_err(SyncError::Rotation)?;
        tracing::debug!(count = existing.len(), "listed webhook subscriptions");

        for subscription in &existing {
            if let Err(e) = self.registrar.delete(base_id, &subscription.id).await {
                tracing::warn!(
                    subscription_id = %subscription.id,
                    error = %e,
                    "failed to delete stale webhook subscription, continuing"
                );
            }
        }

        let created = self
            .registrar
            .create(
                base_id,
                &self.config.notification_url,
                &WebhookFilter::table_data(),
            )
            .await
            .map_err(SyncError::Rotation)?;
        tracing::info!(subscription_id = %created.id, "webhook subscription rotated");

        Ok(())
    }

    /// Fetch the complete record set, threading the continuation token
    /// until the provider stops returning one.
    async fn fetch_all(&self) -> Result<Vec<OrderRecord>, SyncError> {
        let mut all = Vec::new();
        let mut offset: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self
                .source
                .fetch_page(
                    &self.config.base_id,
                    &self.config.table_name,
                    &self.config.view_name,
                    offset.as_deref(),
                )
                .await
                .map_err(SyncError::Fetch)?;

            tracing::debug!(records = page.records.len(), "fetched record page");
            all.extend(page.records);

            match page.next_offset {
                None => return Ok(all),
                next => offset = next,
            }
        }

        Err(SyncError::PageLimitExceeded { limit: MAX_PAGES })
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A sync cycle failed; the previous snapshot is still installed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing or creating the webhook subscription failed.
    #[error("webhook rotation failed: {0}")]
    Rotation(#[source] SourceError),

    /// Fetching or decoding a record page failed.
    #[error("record fetch failed: {0}")]
    Fetch(#[source] SourceError),

    /// The provider kept returning continuation tokens past the page bound.
    #[error("pagination did not terminate within {limit} pages")]
    PageLimitExceeded {
        /// The page bound that was exceeded.
        limit: usize,
    },
}
