//! C2S Gateway Library
//!
//! Lead ingestion gateway for the Contact2Sale (C2S) CRM. Google Ads Lead
//! Form events arrive over a webhook, are enriched against a persisted
//! campaign mapping table, and are forwarded to C2S. The rest of the C2S
//! integration surface (leads, tags, sellers, distribution, company) is
//! exposed as typed pass-through routes.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `enrichment`: Campaign enrichment engine.
//! - `errors`: Error handling types.
//! - `gateway_client`: C2S integration API client.
//! - `handlers`: HTTP request handlers.
//! - `mapping_store`: Campaign mapping table persistence.
//! - `models`: Data models.
//! - `services`: Ads attribution resolver client.
//! - `templates`: Lead body rendering.
//! - `webhook_handler`: Google Ads webhook handler.

pub mod config;
pub mod enrichment;
pub mod errors;
pub mod gateway_client;
pub mod handlers;
pub mod mapping_store;
pub mod models;
pub mod services;
pub mod templates;
pub mod webhook_handler;
