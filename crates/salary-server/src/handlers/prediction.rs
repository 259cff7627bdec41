//! Prediction and history HTTP handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use salary_core::PredictionRecord;
use tracing::warn;

use crate::dto::PredictRequest;
use crate::error::AppError;
use crate::services::prediction as prediction_service;
use crate::ServerState;

/// POST /api/predict - Run the model for `years` and store the result.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionRecord>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected predict body: {}", rejection.body_text());
        AppError::bad_request(prediction_service::YEARS_NOT_A_NUMBER)
    })?;

    let years = prediction_service::require_years(&req)?;
    let record = prediction_service::submit_prediction(&state, years).await?;
    Ok(Json(record))
}

/// GET /api/history - All stored predictions, newest first.
pub async fn history(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<PredictionRecord>>, AppError> {
    let records = prediction_service::list_history(&state).await?;
    Ok(Json(records))
}
