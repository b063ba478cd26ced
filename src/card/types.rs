//! Card data types
//!
//! These types are the contract between the parser and its callers
//! (CLI, history store, clipboard export).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker syntax a card was cut with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `[BOLD: tagline]` followed by `[SOURCE: citation]`, remainder is body
    BracketMarkers,
    /// Tagline on the first line, citation block closed by a `]` line
    CitationBlock,
    /// Tagline on the first line, everything after it is body (no citation)
    Legacy,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::BracketMarkers => "bracket_markers",
            Dialect::CitationBlock => "citation_block",
            Dialect::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three structural zones of a raw card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Tagline,
    Citation,
    Body,
}

impl Zone {
    /// Name of the zone in lexer diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Tagline => "tagline",
            Zone::Citation => "citation",
            Zone::Body => "body",
        }
    }

    /// Name of the `EvidenceCard` field this zone fills
    pub fn field_name(&self) -> &'static str {
        match self {
            Zone::Tagline => "claim",
            Zone::Citation => "citation",
            Zone::Body => "quote",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zones located by the lexer, borrowed from the raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zones<'a> {
    /// Dialect that located the zones
    pub dialect: Dialect,
    pub tagline: &'a str,
    pub citation: &'a str,
    /// Body text, highlight markers still embedded
    pub body: &'a str,
}

/// A parsed evidence card
///
/// All three text fields are non-empty and trimmed. The quote keeps its
/// highlight markers; render it with [`crate::card::render_highlights`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCard {
    /// One-sentence tagline
    pub claim: String,
    /// Free-text bibliographic reference
    pub citation: String,
    /// Verbatim body text with embedded highlight markers
    pub quote: String,
    /// Dialect the card was parsed from
    pub dialect: Dialect,
}

/// A run of body text, either read aloud (emphasized) or context only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub text: String,
    pub emphasized: bool,
}

impl HighlightSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }
}

/// Inline highlight marker syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightDialect {
    /// `[highlight(text)]`
    Paren,
    /// `[HIGHLIGHT: text]`
    Colon,
    /// `<highlight>text</highlight>`
    Tag,
}

impl HighlightDialect {
    /// Opening token, lowercase (matching is ASCII case-insensitive)
    pub fn start_token(&self) -> &'static str {
        match self {
            HighlightDialect::Paren => "[highlight(",
            HighlightDialect::Colon => "[highlight:",
            HighlightDialect::Tag => "<highlight>",
        }
    }
}
