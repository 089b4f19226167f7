// Verity Core Library
// Fact-check adapter: prompt building, model invocation and verdict parsing

pub mod analysis;
pub mod fact_checker;
pub mod invoker;
pub mod llm;
pub mod parser;
pub mod progress;
pub mod prompt;

// Export core types
pub use analysis::{
    AnalysisRequest, AnalysisResult, FactualCheck, GroundingSource, ImageAttachment, Verdict,
};
pub use fact_checker::FactChecker;
pub use invoker::{ModelInvoker, ModelReply};
pub use llm::{GeminiClient, GeminiConfig, GenerationBackend};
pub use progress::{ChannelProgress, ProgressSink, ProgressStage};
pub use prompt::{build_prompt, PromptPayload};

// Error types
use thiserror::Error;

/// Caller-facing message used when a failure carries no message of its own
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Analysis failed. Please try again with a more specific news excerpt.";

#[derive(Error, Debug)]
pub enum VerityError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Request(String),

    /// The model output was not usable structured data.
    /// `raw` holds the offending text for diagnostics and never reaches `Display`.
    #[error("Invalid JSON response from the model")]
    Parse { raw: String, detail: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VerityError {
    /// Build a request error, keeping the upstream message when there is one
    pub fn request(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            VerityError::Request(GENERIC_FAILURE_MESSAGE.to_string())
        } else {
            VerityError::Request(message)
        }
    }

    pub(crate) fn parse(raw: impl Into<String>, detail: impl Into<String>) -> Self {
        VerityError::Parse {
            raw: raw.into(),
            detail: detail.into(),
        }
    }

    /// Raw model output attached to a parse failure
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            VerityError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Single human-readable message for display
    pub fn user_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            msg
        }
    }
}

pub type Result<T> = std::result::Result<T, VerityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_falls_back_to_generic_message() {
        let err = VerityError::request("   ");
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);

        let err = VerityError::request("quota exceeded");
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn parse_error_hides_raw_text_from_display() {
        let err = VerityError::parse("{\"verdict\": \"FA", "EOF while parsing");
        assert_eq!(err.to_string(), "Invalid JSON response from the model");
        assert_eq!(err.raw_output(), Some("{\"verdict\": \"FA"));
        assert!(!err.user_message().contains("verdict"));
    }

    #[test]
    fn io_and_json_failures_convert_with_question_mark() {
        fn read(path: &str) -> Result<String> {
            Ok(std::fs::read_to_string(path)?)
        }
        fn decode(text: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }
        assert!(matches!(read("/nonexistent/verity.txt"), Err(VerityError::Io(_))));
        assert!(matches!(decode("{\"a\":"), Err(VerityError::Serialization(_))));
    }
}
