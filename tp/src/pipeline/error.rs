//! Pipeline error types

use thiserror::Error;

use super::Stage;
use crate::llm::LlmError;

/// Failure of a single backend call
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to render prompt: {0}")]
    Prompt(String),

    #[error("Backend returned no content")]
    EmptyResponse,

    #[error("{0}")]
    Backend(String),
}

/// Errors surfaced by the pipeline controller
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{stage} failed: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenerationError,
    },
}

impl PlanError {
    /// Stage that failed, if this is a generation failure
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PlanError::Generation { stage, .. } => Some(*stage),
            PlanError::Validation(_) => None,
        }
    }

    /// Underlying provider error, if a stage failed inside its LLM client
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            PlanError::Generation {
                source: GenerationError::Llm(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}
