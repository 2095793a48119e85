//! TripPlanner - layered travel plans from three chained LLM calls
//!
//! A trip is planned in three stages: a day-by-day outline, a detailed
//! itinerary built from that outline, and a packing checklist built from the
//! itinerary. The first two stages are conditioned on the traveler's
//! preferences, which persist across runs in a JSON file.
//!
//! # Modules
//!
//! - [`pipeline`] - stage sequencing, context bundles, generation backends
//! - [`conversation`] - session log and preference mining
//! - [`llm`] - LLM client trait with OpenAI-compatible and Gemini clients
//! - [`prompts`] - stage prompt templates
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod pipeline;
pub mod prompts;

pub use config::{Config, StageLlmConfig, StagesConfig};
pub use conversation::{ConversationLog, ConversationTurn, TurnRole};
pub use llm::{CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, OpenAIClient, create_client};
pub use pipeline::{
    GenerationBackend, GenerationError, LlmBackend, PipelineController, PipelineState, PlanError, Stage, StageBackends,
    StageContext, StageContextBuilder, TripResult,
};
pub use prefstore::PreferenceStore;
pub use prompts::PromptLoader;
