//! Generic HTTP model endpoint client.

use async_trait::async_trait;
use reqwest::Client;
use salary_core::{parse_salary, PredictError, Predictor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Serialize)]
struct PredictRequest {
    years: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    predicted_salary: Option<Value>,
}

/// Client for a model served behind a plain JSON HTTP endpoint.
pub struct HttpPredictor {
    client: Client,
    url: String,
}

impl HttpPredictor {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    fn name(&self) -> &str {
        "http"
    }

    async fn predict(&self, years: f64) -> Result<f64, PredictError> {
        let response = self
            .client
            .post(&self.url)
            .json(&PredictRequest { years })
            .send()
            .await
            .map_err(|e| PredictError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PredictError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(PredictError::Rejected { status: status.as_u16(), body });
        }

        debug!("HTTP predictor answered for years={}: {}", years, body);
        salary_from_json(&body)
    }
}

/// Extracts `predictedSalary` from a JSON body. Numeric strings are accepted.
fn salary_from_json(body: &str) -> Result<f64, PredictError> {
    let parsed: PredictResponse = serde_json::from_str(body)
        .map_err(|e| PredictError::Malformed(format!("invalid JSON: {}", e)))?;

    match parsed.predicted_salary {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PredictError::Malformed(format!("unrepresentable number: {}", n))),
        Some(Value::String(s)) => parse_salary(&s),
        Some(other) => Err(PredictError::Malformed(format!(
            "predictedSalary has unexpected type: {}",
            other
        ))),
        None => Err(PredictError::Malformed("missing predictedSalary".into())),
    }
}
