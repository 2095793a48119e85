//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files, one per pipeline stage.
//!
//! Template loading chain:
//! 1. `{prompts-dir}/{stage}.pmt` (user override, `.tripplanner/prompts` by default)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax and render against a `StageContext`.

pub mod embedded;
mod loader;

pub use loader::PromptLoader;
