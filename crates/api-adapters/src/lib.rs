//! # api-adapters
//!
//! The axum routing layer for the board.

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::http::header::InvalidHeaderName;
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use domains::IdentityProvider;
use services::{CommandService, PostService};

pub use error::ApiError;

/// Names of the trusted headers the identity provider reads.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub role: HeaderName,
    pub user: HeaderName,
}

impl IdentityHeaders {
    pub fn new(role: &str, user: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            role: HeaderName::try_from(role)?,
            user: HeaderName::try_from(user)?,
        })
    }
}

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub commands: Arc<CommandService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub headers: IdentityHeaders,
}

/// Builds the full HTTP surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/command", post(handlers::run_command))
        .layer(middleware::cors_policy())
        .layer(middleware::trace_layer())
        .with_state(state)
}
