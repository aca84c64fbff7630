//! Error types for the digit classification pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Model already fitted; call reset() before fitting again")]
    AlreadyFitted,

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label at row {row}: expected an integer, got {value}")]
    InvalidLabel { row: usize, value: f64 },

    #[error("Dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Sample count mismatch: {features} feature rows but {labels} labels")]
    SampleCountMismatch { features: usize, labels: usize },

    #[error("Need at least 2 distinct classes to fit, got {0}")]
    TooFewClasses(usize),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Non-finite value {value} at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize, value: f64 },

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SVMError>;
