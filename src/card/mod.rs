//! Evidence card parsing, normalization and highlight rendering
//!
//! A generated card is a loosely structured blob of text: a tagline, a
//! citation and the verbatim article body annotated with highlight markers.
//! This module turns that blob into an [`EvidenceCard`] and renders its body
//! into [`HighlightSpan`]s.
//!
//! # Design Principles
//!
//! - **Fail loudly**: a card is either fully parsed or a [`CardError`]. No
//!   half-filled records with placeholder text.
//! - **Verbatim body**: only surrounding whitespace is trimmed. Highlight
//!   rendering removes marker syntax and nothing else.
//! - **Never drop text**: malformed highlight markers degrade to literal
//!   text and are reported as [`HighlightAnomaly`].
//! - **Pure**: every function here is a synchronous function of its input.
//!
//! # Example
//!
//! ```
//! use eloquent::card::{parse_card, render_highlights};
//!
//! let raw = "[BOLD: AI adoption is accelerating.]\n\
//!            [SOURCE: Smith, 2024, TechDaily]\n\
//!            Adoption of [highlight(AI tools grew 40%)] this year.";
//!
//! let card = parse_card(raw).unwrap();
//! assert_eq!(card.claim, "AI adoption is accelerating.");
//!
//! let rendered = render_highlights(&card.quote);
//! assert_eq!(rendered.text(), "Adoption of AI tools grew 40% this year.");
//! ```

pub mod citation;
pub mod error;
pub mod export;
pub mod highlight;
pub mod lexer;
pub mod normalize;
pub mod types;

pub use citation::CitationFields;
pub use error::{CardError, HighlightAnomaly, RETRY_MESSAGE};
pub use export::{export_card, spans_to_html, ClipboardExport, DEFAULT_HIGHLIGHT_COLOR};
pub use highlight::{render_highlights, strip_markers, RenderedBody};
pub use lexer::{lex, BracketMarkers, CitationBlock, Lexer, Miss, ZoneStrategy};
pub use normalize::{normalize, parse_card};
pub use types::{Dialect, EvidenceCard, HighlightDialect, HighlightSpan, Zone, Zones};
