//! Remote data + object-storage platform.
//!
//! Handlers only see the [`Records`] and [`ObjectStore`] traits. The
//! Supabase REST client is the production implementation; the in-memory one
//! backs tests and local demos.

pub mod memory;
pub mod models;
pub mod supabase;

use async_trait::async_trait;
use axum::body::Bytes;
use std::time::Duration;
use thiserror::Error;

use models::{
    NewProperty, NewSelection, Property, PropertyChanges, Selection, SelectionWithProperty,
    SiteUser,
};

pub use memory::MemoryPlatform;
pub use supabase::SupabaseClient;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0} not found")]
    NotFound(String),

    /// The platform answered with an error payload.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request to platform failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected platform response: {0}")]
    Decode(String),

    #[error("invalid platform URL: {0}")]
    InvalidUrl(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Table operations against `properties`, `selected_properties`, `site_users`.
#[async_trait]
pub trait Records: Send + Sync {
    /// All properties, newest first.
    async fn list_properties(&self) -> PlatformResult<Vec<Property>>;

    async fn get_property(&self, id: i64) -> PlatformResult<Property>;

    async fn insert_property(&self, property: &NewProperty) -> PlatformResult<Property>;

    async fn update_property(&self, id: i64, changes: &PropertyChanges)
        -> PlatformResult<Property>;

    async fn delete_property(&self, id: i64) -> PlatformResult<()>;

    async fn insert_selection(&self, selection: &NewSelection) -> PlatformResult<Selection>;

    /// Selections joined with their property, newest first.
    async fn list_selections(&self) -> PlatformResult<Vec<SelectionWithProperty>>;

    /// Site users, newest first.
    async fn list_site_users(&self) -> PlatformResult<Vec<SiteUser>>;

    /// Round-trip latency of a trivial query.
    async fn ping(&self) -> PlatformResult<Duration>;
}

/// Object storage scoped to one bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`; returns the path the platform recorded.
    async fn put_object(&self, path: &str, bytes: Bytes, content_type: &str)
        -> PlatformResult<String>;

    async fn remove_object(&self, path: &str) -> PlatformResult<()>;

    async fn ping(&self) -> PlatformResult<Duration>;
}
