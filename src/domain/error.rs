use thiserror::Error;

/// Core domain errors
///
/// `Transient` is the only retryable class; everything else either rejects
/// the input (`Validation`), reports absence (`NotFound`), or marks a
/// dependency that has been skipped for this request (`Degraded`).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Transient I/O error: {message}")]
    Transient { message: String },

    #[error("Degraded: {component} unavailable - {message}")]
    Degraded { component: String, message: String },

    #[error("Embedding unavailable: {message}")]
    EmbeddingUnavailable { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn degraded(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Degraded {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn embedding_unavailable(message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the operation that produced this error may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Record 'squat-001' not found");
        assert_eq!(error.to_string(), "Not found: Record 'squat-001' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Vector width 42 is not accepted");
        assert_eq!(
            error.to_string(),
            "Validation error: Vector width 42 is not accepted"
        );
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(DomainError::transient("timeout").is_retryable());
        assert!(!DomainError::validation("bad input").is_retryable());
        assert!(!DomainError::not_found("missing").is_retryable());
        assert!(!DomainError::degraded("nutrition", "store down").is_retryable());
        assert!(!DomainError::embedding_unavailable("quota").is_retryable());
    }

    #[test]
    fn test_degraded_error_names_component() {
        let error = DomainError::degraded("exercises", "scan failed");
        assert_eq!(
            error.to_string(),
            "Degraded: exercises unavailable - scan failed"
        );
    }
}
