//! Core types and shared functionality for render-cache.
//!
//! This crate provides:
//! - Named content stores (SQLite and in-memory) keyed by request identity
//! - The cache manager with list/evict/remove/add operations
//! - The remotely callable service contract over those operations
//! - Unified error types and configuration

pub mod config;
pub mod error;
pub mod manager;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use manager::{IMAGE_PNG, RenderCache, TEXT_HTML};
pub use service::{ContentArg, Exporter, Invocation, RenderCacheService, Reply, SERVICE_NAME};
pub use store::{
    Body, CacheDb, ContentStore, DeleteOptions, Headers, MemoryStore, RequestIdentity, SqliteStore, StoredResponse,
};
