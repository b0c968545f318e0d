//! HTTP API and web page for tokenmeter.
//!
//! Endpoints:
//! - `GET /` - a single page form for pasting text or uploading a file
//! - `GET /api/models` - loaded models (plus unavailable ones in remote mode)
//! - `POST /api/calculate` - token counts per model, as multipart, urlencoded
//!   form or JSON
//! - `GET /api/health` - loaded versus expected tokenizers
//!
//! The registry is built on the first request that needs it, on the
//! blocking thread pool.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokenmeter_core::{LocalLoader, TokenizerRegistry};
//! use tokenmeter_server::TokenmeterRouter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TokenizerRegistry::new(LocalLoader::new("./tokenizers"));
//! let app = TokenmeterRouter::new(registry).debug(true).build();
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod input;
pub mod router;
pub(crate) mod state;
pub mod upload;

// Re-exports
pub use config::ServerArgs;
pub use error::{ApiError, ServerError, ServerResult};
pub use input::CalculateInput;
pub use router::{TokenmeterRouter, MAX_BODY_BYTES};
