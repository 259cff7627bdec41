//! Environment-driven configuration for the salary prediction service.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. There are no CLI flags.

use std::env;
use std::fmt;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_URL: &str = "data/predictions.db";
pub const DEFAULT_AWS_REGION: &str = "ap-northeast-2";

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("Unknown predictor kind: {0} (expected \"sagemaker\" or \"http\")")]
    UnknownPredictor(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Structs
// ─────────────────────────────────────────────────────────────────────────────

/// Static AWS credentials supplied through the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SageMakerConfig {
    pub endpoint_name: String,
    pub region: String,
    /// `None` falls back to the SDK default credential chain.
    pub credentials: Option<AwsCredentials>,
}

/// Which predictor backend the service talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictorConfig {
    /// Plain HTTP model endpoint taking `{"years": n}`.
    Http { url: String },
    /// Managed SageMaker inference endpoint.
    SageMaker(SageMakerConfig),
}

impl PredictorConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            PredictorConfig::Http { .. } => "http",
            PredictorConfig::SageMaker(_) => "sagemaker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub database_url: String,
    pub predictor: PredictorConfig,
}

impl ServiceConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let kind = get("PREDICTOR").unwrap_or_else(|| "sagemaker".to_string());
        let predictor = match kind.to_ascii_lowercase().as_str() {
            "http" => PredictorConfig::Http {
                url: get("MODEL_URL").ok_or(ConfigError::Missing("MODEL_URL"))?,
            },
            "sagemaker" => {
                let credentials = match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
                    (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                        access_key_id,
                        secret_access_key,
                        session_token: get("AWS_SESSION_TOKEN"),
                    }),
                    _ => None,
                };
                PredictorConfig::SageMaker(SageMakerConfig {
                    endpoint_name: get("SAGEMAKER_ENDPOINT")
                        .ok_or(ConfigError::Missing("SAGEMAKER_ENDPOINT"))?,
                    region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
                    credentials,
                })
            }
            _ => return Err(ConfigError::UnknownPredictor(kind)),
        };

        Ok(Self { port, database_url, predictor })
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
