//! Error types for the drift/hedge pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HedgeError {
    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model fit error: {0}")]
    ModelFit(String),

    #[error("Degenerate binomial state: {0}")]
    DegenerateState(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Transport-level failure; retried by providers before it becomes `DataUnavailable`
    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

pub type HedgeResult<T> = Result<T, HedgeError>;

impl HedgeError {
    pub fn empty_data(msg: impl Into<String>) -> Self {
        Self::EmptyData(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn model_fit(msg: impl Into<String>) -> Self {
        Self::ModelFit(msg.into())
    }

    pub fn degenerate_state(msg: impl Into<String>) -> Self {
        Self::DegenerateState(msg.into())
    }

    pub fn division_by_zero(msg: impl Into<String>) -> Self {
        Self::DivisionByZero(msg.into())
    }

    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Either flavour of up == down degeneracy
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateState(_) | Self::DivisionByZero(_))
    }
}
