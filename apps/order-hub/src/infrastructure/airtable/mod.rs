//! Airtable Adapter
//!
//! REST client for the Airtable API, implementing the record-source and
//! webhook-registrar ports plus base-name resolution against the metadata
//! API. One client instance is shared across the service; it is cheap to
//! clone (reqwest pools connections internally).

mod api_types;
mod client;
mod error;

pub use client::AirtableClient;
pub use error::AirtableError;
