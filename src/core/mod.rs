//! Card cutting logic.
//!
//! This module contains:
//! - Safety: size limits, timeout and input denylist
//! - Prompt: the card cutting prompt template
//! - Payload: card text extraction from generator output
//! - Cutter: the end-to-end cutting workflow

pub mod cutter;
pub mod payload;
pub mod prompt;
pub mod safety;

// Re-export commonly used types
pub use cutter::{ArticleSource, CardCutter, CutError, CutOutcome, CutRequest};
pub use payload::extract_card_payload;
pub use prompt::build_prompt;
pub use safety::{SafetyLimits, SafetyViolation};
