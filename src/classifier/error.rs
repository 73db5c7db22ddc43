use std::fmt;

/// Represents the different types of errors that can occur during inference.
#[derive(Debug)]
pub enum ClassifierError {
    /// Error occurred due to invalid input values
    ValidationError(String),
    /// Error occurred while making predictions
    PredictionError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}
