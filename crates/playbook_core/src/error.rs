use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybookError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybookError {
    pub fn formation_not_found(id: impl Into<String>) -> Self {
        PlaybookError::NotFound { kind: "formation", id: id.into() }
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        PlaybookError::Geometry(msg.into())
    }

    /// Soft failures are routine during interactive use and never need to
    /// reach the user as an error dialog.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlaybookError::NotFound { .. } => true,
            PlaybookError::InvalidState(_) => true,
            PlaybookError::Io(_) => true,
            PlaybookError::Parse(_) => false,
            PlaybookError::Geometry(_) => false,
            PlaybookError::Config(_) => false,
        }
    }
}

impl From<serde_json::Error> for PlaybookError {
    fn from(err: serde_json::Error) -> Self {
        PlaybookError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for PlaybookError {
    fn from(err: serde_yaml::Error) -> Self {
        PlaybookError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlaybookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PlaybookError::formation_not_found("pistol-2");
        assert_eq!(err.to_string(), "formation not found: pistol-2");

        let err = PlaybookError::geometry("container has zero width");
        assert_eq!(err.to_string(), "Geometry error: container has zero width");
    }

    #[test]
    fn test_json_errors_become_parse_errors() {
        let err: PlaybookError = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err().into();
        assert!(matches!(err, PlaybookError::Parse(_)));
        assert!(!err.is_recoverable());
    }
}
