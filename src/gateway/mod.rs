//! Data access gateway - CRUD calls against the remote blog collection
//!
//! The App layer never talks HTTP directly; the Network actor drives a
//! `BlogGateway` trait object so tests can swap in an in-memory backend.

pub mod http;
pub mod image;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{BlogPayload, BlogRecord};

pub use http::HttpGateway;

#[async_trait]
pub trait BlogGateway: Send + Sync {
    /// Read the whole collection
    async fn list(&self) -> Result<Vec<BlogRecord>, GatewayError>;

    /// Create a record. `None` when the backend's body is not a bare record.
    async fn create(&self, payload: BlogPayload) -> Result<Option<BlogRecord>, GatewayError>;

    /// Replace the record with `id`
    async fn update(
        &self,
        id: &str,
        payload: BlogPayload,
    ) -> Result<Option<BlogRecord>, GatewayError>;

    async fn delete(&self, id: &str) -> Result<(), GatewayError>;
}
