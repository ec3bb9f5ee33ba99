use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("External API error: {0}")]
    External(String),
    /// Completion text that could not be read as a JSON object, even after
    /// brace extraction. `raw` is the untouched model output.
    #[error("Model output is not a JSON object")]
    MalformedModelOutput { raw: String },
    #[error("Invalid price relationship: buy={buy_price} sell={sell_price}")]
    InvalidPriceRelationship { buy_price: f64, sell_price: f64 },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable kind used as the `error` field of JSON bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "InvalidRequest",
            AppError::MethodNotAllowed => "MethodNotAllowed",
            AppError::External(_) => "UpstreamCallFailure",
            AppError::MalformedModelOutput { .. } => "MalformedModelOutput",
            AppError::InvalidPriceRelationship { .. } => "InvalidPriceRelationship",
            AppError::Config(_) => "Configuration",
            AppError::Other(_) => "Internal",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::External(e.to_string())
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
