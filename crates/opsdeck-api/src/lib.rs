//! # opsdeck-api
//!
//! HTTP API layer for Opsdeck built on Axum.
//!
//! Provides the auth, session administration, and notification push
//! endpoints, the WebSocket upgrade, the `AuthUser` extractor, DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::run_server;
pub use error::ApiError;
pub use state::AppState;
