//! Error types for Notat.

use thiserror::Error;

/// Library-level error type for Notat operations.
#[derive(Error, Debug)]
pub enum NotatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Note assembly failed: {0}")]
    Assembly(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl NotatError {
    /// The pipeline stage this error belongs to, if any.
    ///
    /// Failed jobs are tagged with the stage so callers see which step broke
    /// without being handed an engine stack trace.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            NotatError::Validation(_) => Some("validation"),
            NotatError::Transcription(_) => Some("transcription"),
            NotatError::Segmentation(_) => Some("segmentation"),
            NotatError::Summarization(_) => Some("summarization"),
            NotatError::Assembly(_) => Some("assembly"),
            NotatError::Export(_) => Some("export"),
            _ => None,
        }
    }
}

/// Result type alias for Notat operations.
pub type Result<T> = std::result::Result<T, NotatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tags() {
        assert_eq!(
            NotatError::Transcription("bad codec".into()).stage(),
            Some("transcription")
        );
        assert_eq!(
            NotatError::Summarization("chunk".into()).stage(),
            Some("summarization")
        );
        assert_eq!(NotatError::NotFound("job".into()).stage(), None);
    }
}
