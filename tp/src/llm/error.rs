//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Unknown LLM provider: '{0}'. Supported: openai, groq, gemini")]
    UnknownProvider(String),
}

impl LlmError {
    /// Check if the provider rejected the credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::ApiError { status: 401 | 403, .. } | LlmError::MissingApiKey(_))
    }

    /// Check if the provider reported a quota or rate limit
    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::ApiError { status: 429, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth() {
        assert!(
            LlmError::ApiError {
                status: 401,
                message: "bad key".to_string()
            }
            .is_auth()
        );
        assert!(LlmError::MissingApiKey("GROQ_API_KEY".to_string()).is_auth());
        assert!(
            !LlmError::ApiError {
                status: 500,
                message: "Server error".to_string()
            }
            .is_auth()
        );
    }

    #[test]
    fn test_is_quota() {
        assert!(
            LlmError::ApiError {
                status: 429,
                message: "slow down".to_string()
            }
            .is_quota()
        );
        assert!(!LlmError::InvalidResponse("Bad JSON".to_string()).is_quota());
    }

    #[test]
    fn test_missing_key_message_names_variable() {
        let err = LlmError::MissingApiKey("GOOGLE_API_KEY".to_string());
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }
}
