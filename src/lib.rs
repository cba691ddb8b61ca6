//! BookSwap - Peer-to-Peer Book Exchange
//!
//! A Rust REST API server where users list books for exchange, browse other
//! people's listings, and send requests that listing owners accept or decline.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
