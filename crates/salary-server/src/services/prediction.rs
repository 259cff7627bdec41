//! Prediction submission and history service.

use salary_core::{NewPrediction, PredictionRecord};
use tracing::{error, info};

use crate::dto::PredictRequest;
use crate::error::AppError;
use crate::ServerState;

pub const YEARS_REQUIRED: &str = "years is required";
pub const YEARS_NOT_A_NUMBER: &str = "years must be a number";
pub const PREDICTION_FAILED: &str = "prediction failed";

/// Returns the submitted years, or a client error when absent.
pub fn require_years(req: &PredictRequest) -> Result<f64, AppError> {
    req.years.ok_or_else(|| AppError::bad_request(YEARS_REQUIRED))
}

/// Calls the predictor, then appends the result. The store is only touched
/// after the predictor succeeded.
pub async fn submit_prediction(state: &ServerState, years: f64) -> Result<PredictionRecord, AppError> {
    let predicted_salary = state.predictor.predict(years).await.map_err(|e| {
        error!(predictor = state.predictor.name(), "Prediction failed for years={}: {}", years, e);
        AppError::internal(PREDICTION_FAILED)
    })?;

    let record = state
        .store
        .append(NewPrediction::new(years, predicted_salary))
        .await
        .map_err(|e| {
            error!("Failed to store prediction for years={}: {}", years, e);
            AppError::internal(PREDICTION_FAILED)
        })?;

    info!(
        id = %record.id,
        years = record.years,
        predicted_salary = record.predicted_salary,
        "Prediction stored"
    );
    Ok(record)
}

/// Every stored record, newest first.
pub async fn list_history(state: &ServerState) -> Result<Vec<PredictionRecord>, AppError> {
    state.store.history().await.map_err(|e| {
        error!("Failed to read prediction history: {}", e);
        AppError::Unhandled
    })
}
