//! Three-stage planning pipeline
//!
//! Outline, then detailed itinerary, then packing checklist. Each stage sees
//! the output of the stage before it; only the first two see the raw
//! preference text.

use std::fmt;

use serde::Serialize;

mod backend;
mod context;
mod controller;
mod error;

pub use backend::{GenerationBackend, LlmBackend, StageBackends};
pub use context::{NO_PREFERENCES, PREFERENCE_SEPARATOR, StageContext, StageContextBuilder, combine_preferences};
pub use controller::{PipelineController, PipelineState, TripResult};
pub use error::{GenerationError, PlanError};

/// One of the ordered generation steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Outline,
    Itinerary,
    Packing,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Outline, Stage::Itinerary, Stage::Packing];

    /// 1-based position in the pipeline
    pub fn index(&self) -> u8 {
        match self {
            Stage::Outline => 1,
            Stage::Itinerary => 2,
            Stage::Packing => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Outline => "outline",
            Stage::Itinerary => "itinerary",
            Stage::Packing => "packing",
        }
    }

    /// Controller state while this stage's backend call is in flight
    pub fn running_state(&self) -> PipelineState {
        match self {
            Stage::Outline => PipelineState::Stage1Running,
            Stage::Itinerary => PipelineState::Stage2Running,
            Stage::Packing => PipelineState::Stage3Running,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({})", self.index(), self.name())
    }
}
