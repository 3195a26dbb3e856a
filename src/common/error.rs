//! Error types for prm_car

use thiserror::Error;

/// Main error type for the planner
///
/// Blocked edges and unreachable goals are ordinary results and never show up here.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Invalid parameter (non-positive radius or step, empty bounds, NaN pose)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Numerical computation failed
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::ConfigError(e.to_string())
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::InvalidParameter("turning radius must be positive".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid parameter: turning radius must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::IoError(_)));
    }
}
