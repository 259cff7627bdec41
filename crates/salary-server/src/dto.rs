use serde::Deserialize;

// === HTTP DTOs ===

/// Body of `POST /api/predict`. `years` is optional here so that a missing
/// value can be reported with the service's own message.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub years: Option<f64>,
}
