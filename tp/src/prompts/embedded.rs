//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Stage 1: day-by-day outline
pub const OUTLINE: &str = include_str!("../../prompts/outline.pmt");

/// Stage 2: detailed itinerary
pub const ITINERARY: &str = include_str!("../../prompts/itinerary.pmt");

/// Stage 3: packing checklist
pub const PACKING: &str = include_str!("../../prompts/packing.pmt");

/// System prompt sent alongside every stage
pub const SYSTEM: &str = "You are a helpful travel planning assistant. Follow the requested format exactly.";

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "outline" => Some(OUTLINE),
        "itinerary" => Some(ITINERARY),
        "packing" => Some(PACKING),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
