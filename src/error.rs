use std::error::Error;
use std::fmt;

/// Error taxonomy for the churn pipeline.
///
/// Codec and record errors (`SchemaMismatch`, `MissingFeature`,
/// `UnknownCategory`) are per-request and recoverable; `DataLoad` and an
/// all-variant `Training` failure are fatal at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ChurnError {
    /// The dataset file is missing or cannot be parsed as a labelled table.
    DataLoad { path: String, reason: String },
    /// A fitted feature column is absent or carries the wrong value type.
    SchemaMismatch { column: String, reason: String },
    /// A single record lacks one of the fitted feature columns.
    MissingFeature { column: String },
    /// A categorical value that was never seen when the codec was fitted.
    UnknownCategory { column: String, value: String },
    /// `predict` was invoked before the pipeline reached the ready state.
    ModelNotReady { state: &'static str },
    /// A model variant failed to fit or to produce predictions.
    Training { model: String, reason: String },
}

impl fmt::Display for ChurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnError::DataLoad { path, reason } => {
                write!(f, "failed to load dataset '{}': {}", path, reason)
            }
            ChurnError::SchemaMismatch { column, reason } => {
                write!(f, "schema mismatch in column '{}': {}", column, reason)
            }
            ChurnError::MissingFeature { column } => {
                write!(f, "missing feature column '{}'", column)
            }
            ChurnError::UnknownCategory { column, value } => {
                write!(f, "unknown category '{}' in column '{}'", value, column)
            }
            ChurnError::ModelNotReady { state } => {
                write!(f, "pipeline is not ready to serve predictions (state: {})", state)
            }
            ChurnError::Training { model, reason } => {
                write!(f, "model '{}' failed to train: {}", model, reason)
            }
        }
    }
}

impl Error for ChurnError {}
