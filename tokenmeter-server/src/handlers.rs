//! HTTP handlers for the tokenmeter endpoints.

use axum::{extract::State, http::StatusCode, response::Html, Json};
use serde::Serialize;
use tokenmeter_core::{CountError, HealthReport, HealthStatus, ModelReport};
use tracing::{debug, warn};

use crate::error::{ServerError, ServerResult};
use crate::input::CalculateInput;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Entry of `GET /api/models`
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub key: String,
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub success: bool,
    pub models: Vec<ModelInfo>,
    pub loaded_count: usize,
    pub total_count: usize,
    pub local_mode: bool,
}

/// Counting result of one model
#[derive(Debug, Serialize)]
pub struct ModelResult {
    pub model: String,
    pub model_name: String,
    #[serde(flatten)]
    pub report: ModelReport,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub success: bool,
    pub text_length: usize,
    pub text_preview: String,
    pub results: Vec<ModelResult>,
}

/// Serve the single page form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// List loaded models.
///
/// In remote mode the catalog keys that failed to load are listed too,
/// with `available: false`. Nothing loaded at all is a 503.
pub async fn list_models(State(state): State<AppState>) -> ServerResult<Json<ModelsResponse>> {
    let loaded = state.tokenizers().await?;
    if loaded.is_empty() {
        return Err(state.error(CountError::NoTokenizers));
    }

    let mut models: Vec<ModelInfo> = loaded
        .keys()
        .map(|key| ModelInfo {
            key: key.to_string(),
            name: loaded.display_name(key).to_string(),
            available: true,
        })
        .collect();

    if !loaded.mode().is_local() {
        models.extend(
            loaded
                .catalog()
                .entries()
                .filter(|entry| !loaded.contains(&entry.key))
                .map(|entry| ModelInfo {
                    key: entry.key.clone(),
                    name: entry.name().to_string(),
                    available: false,
                }),
        );
    }
    models.sort_by(|a, b| a.key.cmp(&b.key));

    Ok(Json(ModelsResponse {
        success: true,
        models,
        loaded_count: loaded.len(),
        total_count: loaded.expected_count(),
        local_mode: loaded.mode().is_local(),
    }))
}

/// Count tokens for the submitted text.
pub async fn calculate(
    State(state): State<AppState>,
    input: Result<CalculateInput, ServerError>,
) -> ServerResult<Json<CalculateResponse>> {
    let CalculateInput { text, models } = input.map_err(|e| state.error(e))?;
    if text.is_empty() {
        return Err(state.error(CountError::EmptyText));
    }

    let loaded = state.tokenizers().await?;
    let selection = loaded.select(models.as_slice()).map_err(|e| state.error(e))?;
    debug!(models = ?selection, bytes = text.len(), "calculating");

    let calculation = tokio::task::spawn_blocking(move || selection.calculate(&text))
        .await
        .map_err(|e| state.error(ServerError::Internal(e.to_string())))?
        .map_err(|e| state.error(e))?;

    let mut results = Vec::with_capacity(calculation.outcomes.len());
    for outcome in calculation.outcomes {
        match outcome.result {
            Ok(report) => results.push(ModelResult {
                model: outcome.model,
                model_name: outcome.model_name,
                report,
            }),
            Err(e) => warn!(model = %outcome.model, error = %e, "omitting failed model from results"),
        }
    }

    Ok(Json(CalculateResponse {
        success: true,
        text_length: calculation.text_length,
        text_preview: calculation.text_preview,
        results,
    }))
}

/// Report loaded versus expected tokenizers.
///
/// Answers 503 when nothing is loaded.
pub async fn health(
    State(state): State<AppState>,
) -> ServerResult<(StatusCode, Json<HealthReport>)> {
    let report = state.tokenizers().await?.health();
    let status = match report.status {
        HealthStatus::Error => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    Ok((status, Json(report)))
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
