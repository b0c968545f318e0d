//! Router builder for tokenmeter HTTP endpoints.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokenmeter_core::TokenizerRegistry;
use tower_http::trace::TraceLayer;

use crate::handlers::{calculate, health, index, list_models};
use crate::state::AppState;

/// Largest accepted request body (uploads included)
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Builder for configuring tokenmeter HTTP endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use tokenmeter_core::{LocalLoader, TokenizerRegistry};
/// use tokenmeter_server::TokenmeterRouter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = TokenizerRegistry::new(LocalLoader::new("./tokenizers"));
/// let app = TokenmeterRouter::new(registry).build();
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub struct TokenmeterRouter {
    registry: Arc<TokenizerRegistry>,
    debug: bool,
}

impl TokenmeterRouter {
    /// Create a new router builder with the given registry.
    pub fn new(registry: TokenizerRegistry) -> Self {
        Self::from_arc(Arc::new(registry))
    }

    /// Create a new router builder from an existing `Arc<TokenizerRegistry>`.
    ///
    /// Use this when the registry is shared with other parts of the
    /// application, e.g. to warm it up before serving.
    pub fn from_arc(registry: Arc<TokenizerRegistry>) -> Self {
        Self {
            registry,
            debug: false,
        }
    }

    /// Include error detail in failed response bodies.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the router with all endpoints.
    ///
    /// Routes:
    /// - `GET /` - the web page
    /// - `GET /api/models`
    /// - `POST /api/calculate`
    /// - `GET /api/health`
    pub fn build(self) -> Router {
        let state = AppState::new(self.registry, self.debug);

        Router::new()
            .route("/", get(index))
            .route("/api/models", get(list_models))
            .route("/api/calculate", post(calculate))
            .route("/api/health", get(health))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Build the router and nest it under a prefix path.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use tokenmeter_core::{LocalLoader, TokenizerRegistry};
    /// # use tokenmeter_server::TokenmeterRouter;
    /// # use axum::Router;
    /// let registry = TokenizerRegistry::new(LocalLoader::new("./tokenizers"));
    /// // Routes at /tokens/api/calculate etc.
    /// let app = Router::new().merge(TokenmeterRouter::new(registry).build_nested("/tokens"));
    /// ```
    pub fn build_nested(self, prefix: impl Into<String>) -> Router {
        Router::new().nest(&prefix.into(), self.build())
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
