//! Predictor clients for the salary service.
//!
//! Two backends implement [`salary_core::Predictor`]:
//!
//! - [`HttpPredictor`] posts `{"years": n}` to a plain HTTP model endpoint.
//! - [`SageMakerPredictor`] invokes a managed SageMaker inference endpoint.
//!
//! [`build_predictor`] picks one from configuration.

mod http;
mod sagemaker;

use std::sync::Arc;

use salary_config::PredictorConfig;
use salary_core::Predictor;
use tracing::info;

pub use http::HttpPredictor;
pub use sagemaker::SageMakerPredictor;

/// Constructs the predictor selected by `config`.
pub async fn build_predictor(config: &PredictorConfig) -> Arc<dyn Predictor> {
    match config {
        PredictorConfig::Http { url } => {
            info!("Using HTTP predictor at {}", url);
            Arc::new(HttpPredictor::new(url.as_str()))
        }
        PredictorConfig::SageMaker(sm) => {
            info!(
                "Using SageMaker predictor: endpoint={}, region={}, explicit_credentials={}",
                sm.endpoint_name,
                sm.region,
                sm.credentials.is_some()
            );
            Arc::new(SageMakerPredictor::from_config(sm).await)
        }
    }
}
