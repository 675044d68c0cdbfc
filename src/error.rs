use thiserror::Error;

/// Errors surfaced while resolving and scoring a matchup
#[derive(Error, Debug)]
pub enum PredictError {
    // Lookup errors
    #[error("Team not found: {team} ({season})")]
    TeamNotFound { team: String, season: String },

    #[error("Unknown pitcher: {0}")]
    UnknownPitcher(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    // Validation errors
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    // Collaborator I/O
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl PredictError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PredictError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from bad caller input rather than missing data
    pub fn is_input_error(&self) -> bool {
        matches!(self, PredictError::InvalidInput { .. } | PredictError::TeamNotFound { .. })
    }
}

pub type PredictResult<T> = std::result::Result<T, PredictError>;

/// Reject a stat that is negative, NaN or infinite. Values are never clamped.
pub fn ensure_rate(field: &str, value: f64) -> PredictResult<()> {
    if !value.is_finite() {
        return Err(PredictError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(PredictError::invalid(field, format!("must be non-negative, got {value}")));
    }
    Ok(())
}

/// Reject a signed stat that is NaN or infinite.
pub fn ensure_finite(field: &str, value: f64) -> PredictResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PredictError::invalid(field, format!("must be finite, got {value}")))
    }
}
