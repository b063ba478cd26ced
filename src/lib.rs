//! eloquent - Debate evidence card cutter
//!
//! Turns text generated by an LLM into structured debate evidence cards
//! and renders their highlights for display and clipboard export.
//!
//! # Architecture
//!
//! The core is pure, synchronous text processing:
//! - The lexer locates tagline, citation and body zones across several
//!   historical marker dialects
//! - The normalizer trims zones into an `EvidenceCard`, or fails explicitly
//! - The highlight renderer splits the body into emphasized/plain spans
//!
//! Around it sit the generation workflow (prompt, Fabric adapter, safety
//! limits), a JSONL card history and the CLI.
//!
//! # Modules
//!
//! - `card`: Parsing, normalization, highlight rendering, export
//! - `core`: Card cutting workflow (CardCutter, SafetyLimits)
//! - `adapters`: External text generation (Fabric)
//! - `history`: Persisted card history
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Parse a generated card
//! eloquent parse --input card.txt
//!
//! # Cut a card from an article
//! eloquent cut "Economic growth is slowing in Europe." --url https://example.com/a
//!
//! # Show saved cards
//! eloquent history list
//! ```

pub mod adapters;
pub mod card;
pub mod cli;
pub mod config;
pub mod core;
pub mod history;

// Re-export main types at crate root for convenience
pub use card::{
    parse_card, render_highlights, CardError, CitationFields, EvidenceCard, HighlightSpan,
    RenderedBody,
};
pub use crate::core::{CardCutter, CutRequest};
pub use history::{HistoryEntry, HistoryStore};
