//! SageMaker Runtime inference client.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sagemakerruntime::config::{Credentials, Region};
use aws_sdk_sagemakerruntime::error::DisplayErrorContext;
use aws_sdk_sagemakerruntime::primitives::Blob;
use aws_sdk_sagemakerruntime::Client;
use salary_config::SageMakerConfig;
use salary_core::{parse_salary, PredictError, Predictor};
use tracing::debug;

const CONTENT_TYPE: &str = "text/csv";

/// Client for a model hosted on a SageMaker inference endpoint.
pub struct SageMakerPredictor {
    client: Client,
    endpoint_name: String,
}

impl SageMakerPredictor {
    /// Loads the AWS SDK config for the configured region and credentials.
    pub async fn from_config(config: &SageMakerConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(creds) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                "environment",
            ));
        }

        let sdk_config = loader.load().await;
        Self::with_client(Client::new(&sdk_config), config.endpoint_name.clone())
    }

    pub fn with_client(client: Client, endpoint_name: impl Into<String>) -> Self {
        Self { client, endpoint_name: endpoint_name.into() }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }
}

#[async_trait]
impl Predictor for SageMakerPredictor {
    fn name(&self) -> &str {
        "sagemaker"
    }

    async fn predict(&self, years: f64) -> Result<f64, PredictError> {
        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type(CONTENT_TYPE)
            .body(Blob::new(csv_payload(years)))
            .send()
            .await
            .map_err(|e| PredictError::Unreachable(DisplayErrorContext(&e).to_string()))?;

        let body: Option<&[u8]> = output.body().map(|b| b.as_ref());
        debug!("SageMaker endpoint {} answered for years={}", self.endpoint_name, years);
        salary_from_body(body)
    }
}

/// Single-feature CSV row, shortest decimal form (`5`, `2.5`).
fn csv_payload(years: f64) -> String {
    years.to_string()
}

fn salary_from_body(body: Option<&[u8]>) -> Result<f64, PredictError> {
    let bytes = body.ok_or_else(|| PredictError::Malformed("empty response body".into()))?;
    let text = std::str::from_utf8(bytes)
        .map_err(|e| PredictError::Malformed(format!("response is not UTF-8: {}", e)))?;
    parse_salary(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use aws_sdk_sagemakerruntime::config::retry::RetryConfig;
    use axum::extract::{Path, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;

    /// (path, content type, body) of every invocation the fake endpoint saw.
    type Invocations = Arc<Mutex<Vec<(String, String, String)>>>;

    async fn invocations(
        State(seen): State<Invocations>,
        Path(name): Path<String>,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, String) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.lock()
            .unwrap()
            .push((format!("/endpoints/{}/invocations", name), content_type, body));

        match name.as_str() {
            "down" => (StatusCode::INTERNAL_SERVER_ERROR, "model crashed".to_string()),
            "garbage" => (StatusCode::OK, "n/a".to_string()),
            _ => (StatusCode::OK, " 85000.5\n".to_string()),
        }
    }

    async fn fake_endpoint() -> (Client, Invocations) {
        let seen: Invocations = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/endpoints/{name}/invocations", post(invocations))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = aws_sdk_sagemakerruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIATEST", "secret", None, None, "test"))
            .retry_config(RetryConfig::disabled())
            .endpoint_url(format!("http://{}", addr))
            .build();

        (Client::from_conf(config), seen)
    }

    #[tokio::test]
    async fn test_predict_invokes_endpoint() {
        let (client, seen) = fake_endpoint().await;
        let predictor = SageMakerPredictor::with_client(client, "ep");

        assert_eq!(predictor.predict(5.0).await.unwrap(), 85000.5);

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[("/endpoints/ep/invocations".to_string(), "text/csv".to_string(), "5".to_string())]
        );
    }

    #[tokio::test]
    async fn test_predict_server_error() {
        let (client, seen) = fake_endpoint().await;
        let predictor = SageMakerPredictor::with_client(client, "down");

        assert!(matches!(predictor.predict(2.5).await, Err(PredictError::Unreachable(_))));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_predict_non_numeric_body() {
        let (client, _seen) = fake_endpoint().await;
        let predictor = SageMakerPredictor::with_client(client, "garbage");

        assert!(matches!(predictor.predict(1.0).await, Err(PredictError::Malformed(_))));
    }

    #[test]
    fn test_csv_payload() {
        assert_eq!(csv_payload(5.0), "5");
        assert_eq!(csv_payload(2.5), "2.5");
        assert_eq!(csv_payload(0.0), "0");
    }

    #[test]
    fn test_salary_from_body() {
        assert_eq!(salary_from_body(Some(&b"85000.5\n"[..])).unwrap(), 85000.5);
        assert_eq!(salary_from_body(Some(&b"  72000 "[..])).unwrap(), 72000.0);
        assert!(matches!(salary_from_body(None), Err(PredictError::Malformed(_))));
        assert!(matches!(salary_from_body(Some(&b""[..])), Err(PredictError::Malformed(_))));
        assert!(matches!(salary_from_body(Some(&[0xffu8, 0xfe][..])), Err(PredictError::Malformed(_))));
        assert!(matches!(salary_from_body(Some(&b"[85000.5]"[..])), Err(PredictError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_from_config_keeps_endpoint() {
        let config = SageMakerConfig {
            endpoint_name: "salary-endpoint".into(),
            region: "ap-northeast-2".into(),
            credentials: Some(salary_config::AwsCredentials {
                access_key_id: "AKIATEST".into(),
                secret_access_key: "secret".into(),
                session_token: None,
            }),
        };
        let predictor = SageMakerPredictor::from_config(&config).await;
        assert_eq!(predictor.endpoint_name(), "salary-endpoint");
        assert_eq!(predictor.name(), "sagemaker");
    }
}
