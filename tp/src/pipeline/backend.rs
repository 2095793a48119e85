//! Generation backends, one per stage

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{GenerationError, Stage, StageContext};
use crate::config::{StageLlmConfig, StagesConfig};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, create_client};
use crate::prompts::{PromptLoader, embedded};

/// Turns a stage context into generated text
///
/// Implementations do not retry; the controller reports the first failure.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, context: &StageContext) -> Result<String, GenerationError>;
}

/// Backend that renders the stage prompt and sends it to an LLM
pub struct LlmBackend {
    client: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmBackend {
    pub fn new(client: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, config: &StageLlmConfig) -> Self {
        debug!(model = %client.model(), "LlmBackend::new: called");
        Self {
            client,
            prompts,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl GenerationBackend for LlmBackend {
    async fn generate(&self, context: &StageContext) -> Result<String, GenerationError> {
        let stage = context.stage();
        debug!(%stage, model = %self.client.model(), "LlmBackend::generate: called");

        let prompt = self
            .prompts
            .render(context)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt: embedded::SYSTEM.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.client.complete(request).await?;
        info!(
            %stage,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Stage generation finished"
        );

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenerationError::EmptyResponse),
        }
    }
}

/// The three backends the controller drives, in stage order
#[derive(Clone)]
pub struct StageBackends {
    pub outline: Arc<dyn GenerationBackend>,
    pub itinerary: Arc<dyn GenerationBackend>,
    pub packing: Arc<dyn GenerationBackend>,
}

impl StageBackends {
    pub fn new(
        outline: Arc<dyn GenerationBackend>,
        itinerary: Arc<dyn GenerationBackend>,
        packing: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            outline,
            itinerary,
            packing,
        }
    }

    /// Build an LLM-backed backend for every stage from config
    pub fn from_config(stages: &StagesConfig, prompts: PromptLoader) -> Result<Self, LlmError> {
        debug!("StageBackends::from_config: called");
        let prompts = Arc::new(prompts);
        let build = |stage: Stage| -> Result<Arc<dyn GenerationBackend>, LlmError> {
            let config = stages.get(stage);
            let client = create_client(config)?;
            info!(%stage, provider = %config.provider, model = %config.model, "Configured stage backend");
            Ok(Arc::new(LlmBackend::new(client, Arc::clone(&prompts), config)))
        };

        Ok(Self {
            outline: build(Stage::Outline)?,
            itinerary: build(Stage::Itinerary)?,
            packing: build(Stage::Packing)?,
        })
    }

    pub fn get(&self, stage: Stage) -> &Arc<dyn GenerationBackend> {
        match stage {
            Stage::Outline => &self.outline,
            Stage::Itinerary => &self.itinerary,
            Stage::Packing => &self.packing,
        }
    }
}
