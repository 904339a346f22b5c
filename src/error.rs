use thiserror::Error;

/// Errors that can occur while assembling rendered artifacts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Duplicate volume mount path: '{path}'")]
    DuplicateMountPath { path: String },

    #[error("Invalid volume mount path '{path}': '..' segments are not allowed")]
    InvalidMountPath { path: String },

    #[error("Invalid config entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RenderError::DuplicateMountPath {
            path: "/mnt/jail".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate volume mount path: '/mnt/jail'");

        let err = RenderError::InvalidEntry {
            key: "A=B".to_string(),
            reason: "key contains '='".to_string(),
        };
        assert!(err.to_string().contains("A=B"));

        let err = RenderError::InvalidMountPath {
            path: "../etc".to_string(),
        };
        assert!(err.to_string().contains("'../etc'"));
    }
}
