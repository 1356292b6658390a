/// Domain-specific error types for the hedge pipeline.
/// Construction and calibration defects fail fast. Data-quality anomalies are
/// handled locally (excluded prices, infinite fit error) and never reach here.
#[derive(Debug, thiserror::Error)]
pub enum HedgeError {
    #[error("insufficient data: need {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("unknown severity level: {0}")]
    UnknownSeverity(u8),

    #[error("invalid simulation input: {0}")]
    InvalidSimulationInput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for HedgeError {
    fn from(e: reqwest::Error) -> Self {
        HedgeError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for HedgeError {
    fn from(e: serde_json::Error) -> Self {
        HedgeError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for HedgeError {
    fn from(e: std::io::Error) -> Self {
        HedgeError::Io(e.to_string())
    }
}

pub type HedgeResult<T> = Result<T, HedgeError>;
