//! Axum HTTP collector server.
//!
//! This crate provides:
//! - Multipart report ingestion
//! - Record listing and bulk clearing
//! - Static serving of persisted images
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
