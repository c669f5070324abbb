//! Domain error types.

/// Top-level error type for pairfolio.
#[derive(Debug, thiserror::Error)]
pub enum PairfolioError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("insufficient data: have {have} trading dates, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PairfolioError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        PairfolioError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&PairfolioError> for std::process::ExitCode {
    fn from(err: &PairfolioError) -> Self {
        let code: u8 = match err {
            PairfolioError::Io(_) => 1,
            PairfolioError::ConfigParse { .. }
            | PairfolioError::ConfigMissing { .. }
            | PairfolioError::ConfigInvalid { .. } => 2,
            PairfolioError::Data { .. } => 3,
            PairfolioError::InvalidInput { .. } => 4,
            PairfolioError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
