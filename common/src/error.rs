use thiserror::Error;

/// Failures raised by a bar provider. These pass through the engine unchanged.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No bars found for {0}")]
    NotFound(String),

    #[error("Data loading error: {0}")]
    DataLoad(String),

    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("No data available: {0}")]
    NoData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IndicatorError {
    /// Shorthand for the bar-count guard every indicator starts with.
    pub fn require_bars(required: usize, actual: usize) -> Result<()> {
        if actual < required {
            return Err(IndicatorError::InsufficientData { required, actual });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;
