//! Core domain types and traits for the salary prediction service.
//!
//! This crate provides the pieces shared by every other crate:
//!
//! - [`PredictionRecord`] — one stored input/output/timestamp triple
//! - [`Predictor`] — the external model that maps years of experience to a salary
//! - [`PredictionStore`] — the append-only history of records
//! - [`parse_salary`] — whitespace-tolerant numeric parsing of predictor output
//!
//! # Example
//!
//! ```rust
//! use salary_core::parse_salary;
//!
//! assert_eq!(parse_salary(" 85000.5\n").unwrap(), 85000.5);
//! assert!(parse_salary("n/a").is_err());
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while calling the external predictor.
#[derive(Error, Debug)]
pub enum PredictError {
    /// The predictor could not be reached or the transport failed.
    #[error("Predictor request failed: {0}")]
    Unreachable(String),

    /// The predictor answered with a non-success status.
    #[error("Predictor returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The predictor answered but the payload held no usable number.
    #[error("Malformed predictor response: {0}")]
    Malformed(String),
}

/// Errors raised by a [`PredictionStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Lock error")]
    Lock,
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted prediction. Records are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Years of experience submitted by the caller.
    pub years: f64,
    /// Salary returned by the predictor for `years`.
    pub predicted_salary: f64,
    /// Creation time, millisecond precision.
    pub created_at: DateTime<Utc>,
}

/// A prediction that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewPrediction {
    pub years: f64,
    pub predicted_salary: f64,
}

impl NewPrediction {
    pub fn new(years: f64, predicted_salary: f64) -> Self {
        Self { years, predicted_salary }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// An external model mapping years of experience to a predicted salary.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    async fn predict(&self, years: f64) -> Result<f64, PredictError>;
}

/// Append-only storage for prediction records.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Stores a prediction, assigning its id and creation time.
    async fn append(&self, prediction: NewPrediction) -> Result<PredictionRecord, StoreError>;

    /// Returns every record, most recent `created_at` first.
    async fn history(&self) -> Result<Vec<PredictionRecord>, StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parses a salary from predictor text, ignoring surrounding whitespace.
pub fn parse_salary(text: &str) -> Result<f64, PredictError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PredictError::Malformed("empty payload".into()));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| PredictError::Malformed(format!("not a number: {:?}", trimmed)))?;

    match value.is_finite() {
        true => Ok(value),
        false => Err(PredictError::Malformed(format!("not a finite number: {}", trimmed))),
    }
}
