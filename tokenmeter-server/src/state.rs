//! Application state for the tokenmeter server.

use std::sync::Arc;

use tokenmeter_core::{LoadedTokenizers, TokenizerRegistry};

use crate::error::{ServerError, ServerResult};

/// Shared application state containing the registry.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TokenizerRegistry>,
    /// Add error detail to response bodies
    pub debug: bool,
}

impl AppState {
    pub fn new(registry: Arc<TokenizerRegistry>, debug: bool) -> Self {
        Self { registry, debug }
    }

    /// The loaded tokenizers, building them on first use.
    ///
    /// The build does blocking disk or network I/O, so it runs on the
    /// blocking pool.
    pub async fn tokenizers(&self) -> ServerResult<Arc<LoadedTokenizers>> {
        if let Some(loaded) = self.registry.get() {
            return Ok(loaded);
        }

        let registry = self.registry.clone();
        tokio::task::spawn_blocking(move || registry.get_or_build())
            .await
            .map_err(|e| self.error(ServerError::Internal(e.to_string())))
    }

    pub fn error(&self, error: impl Into<ServerError>) -> crate::error::ApiError {
        error.into().with_debug(self.debug)
    }
}
