//! Error taxonomy for the spectral reality model.

/// Errors produced when a raw record cannot become a [`SpectralObject`].
///
/// This is the only failure the registry itself can report. Update paths
/// never fail: malformed optional fields are ignored.
///
/// [`SpectralObject`]: crate::domain::object::SpectralObject
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("spectral object requires a non-empty `{field}`")]
    MissingField { field: &'static str },

    #[error("raw spectral object must be a JSON object")]
    NotAnObject,
}

/// Crate-level errors for the I/O surfaces (ingest, export, configuration).
#[derive(Debug, thiserror::Error)]
pub enum SpectralError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot canonicalize snapshot: {0}")]
    NonCanonical(String),
}

/// Result type for spectral operations that touch I/O or configuration.
pub type Result<T> = std::result::Result<T, SpectralError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = ValidationError::MissingField { field: "origin" };
        assert!(err.to_string().contains("`origin`"));
    }

    #[test]
    fn test_validation_wraps_into_spectral_error() {
        let err: SpectralError = ValidationError::NotAnObject.into();
        assert!(err.to_string().starts_with("validation error"));
        assert!(matches!(
            err,
            SpectralError::Validation(ValidationError::NotAnObject)
        ));
    }

    #[test]
    fn test_config_error_display() {
        let err = SpectralError::Config("SPECTRAL_LOG_LEVEL=loud".to_string());
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_non_canonical_error_display() {
        let err = SpectralError::NonCanonical("non-finite number inf".to_string());
        assert_eq!(
            err.to_string(),
            "cannot canonicalize snapshot: non-finite number inf"
        );
    }
}
