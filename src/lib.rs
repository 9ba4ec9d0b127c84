//! # Blog Admin TUI
//!
//! A terminal admin panel for blog posts served by a REST backend.
//!
//! ## Features
//! - List, create, edit, view and delete posts
//! - Full re-fetch after every mutation
//! - Local image files inlined as data URIs
//! - Structured server error messages surfaced as notifications
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime) driving a `BlogGateway`

pub mod constants;
pub mod config;
pub mod error;
pub mod models;
pub mod ui;
pub mod gateway;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use config::Config;
pub use error::{describe_failure, ErrorBody, GatewayError};
pub use models::{BlogPayload, BlogRecord, Category, FormField, FormState};
pub use gateway::{BlogGateway, HttpGateway};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use app::{AppActor, AppState};
pub use network::NetworkActor;
