#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Hub - Airtable Order Sync & Statistics
//!
//! A service that mirrors an Airtable orders table into an in-memory
//! snapshot, keeps the snapshot fresh through Airtable change webhooks,
//! pushes refresh notices to connected WebSocket subscribers, and serves
//! aggregate order statistics over HTTP.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Order records and statistics with no I/O
//!   - `order`: Typed order records decoded from provider field maps
//!   - `stats`: Single-pass aggregation into a statistics report
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Interfaces for the record source and webhook registrar
//!   - `services`: The sync orchestrator (webhook rotation + full refresh)
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `airtable`: REST client for records, webhooks, and base metadata
//!   - `snapshot`: Atomic-replace store for the current record set
//!   - `notify`: Broadcast fan-out of refresh notices to subscribers
//!   - `http`: Public HTTP surface (health, stats, trigger, WebSocket)
//!   - `config`: Environment-based configuration
//!
//! # Data Flow
//!
//! ```text
//! Airtable ──(webhook ping / startup)──► Sync Orchestrator
//!     ▲                                        │
//!     └──────── paginated fetch ◄──────────────┤
//!                                              ▼
//!                                       Snapshot Store ──► /stats
//!                                              │
//!                                              ▼
//!                                      Notification Hub ──► WS clients
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Order records and statistics with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::order::{OrderRecord, OrderStatus, ValidationError};
pub use domain::stats::{OrderStats, aggregate};

// Application ports and services
pub use application::ports::{
    RecordPage, RecordSource, SourceError, WebhookFilter, WebhookRegistrar, WebhookSubscription,
};
pub use application::services::sync::{SyncConfig, SyncError, SyncReport, SyncService};

// Infrastructure
pub use infrastructure::airtable::{AirtableClient, AirtableError};
pub use infrastructure::config::AppConfig;
pub use infrastructure::http::{ApiServer, ApiServerError, ApiState};
pub use infrastructure::notify::{NotificationHub, RefreshNotice};
pub use infrastructure::snapshot::SnapshotStore;
