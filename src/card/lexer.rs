//! Zone lexer for raw generated cards
//!
//! Generated cards arrive in several historical layouts. Each layout is a
//! self-contained [`ZoneStrategy`]; the [`Lexer`] tries them in a fixed
//! priority order and the first one that locates every zone wins.
//!
//! # Dialects
//!
//! - **Bracket markers**: `[BOLD: tagline]` ... `[SOURCE: citation]` body
//! - **Citation block**: tagline on the first line, citation lines up to and
//!   including the first line containing `]`, body after that
//! - **Legacy**: tagline on the first line, body after it, no citation. Never
//!   yields a card (a card needs a citation) but is reported in diagnostics.
//!
//! Zones are slices of the raw text. Nothing is copied or rewritten here.

use tracing::debug;

use super::error::CardError;
use super::normalize::normalize;
use super::types::{Dialect, EvidenceCard, Zone, Zones};

const BOLD_MARKER: &str = "[BOLD:";
const SOURCE_MARKER: &str = "[SOURCE:";

/// Zones a strategy could not locate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miss {
    /// Layout the text was closest to
    pub dialect: Dialect,
    pub missing: Vec<Zone>,
}

impl Miss {
    fn new(dialect: Dialect, missing: &[Zone]) -> Self {
        Self {
            dialect,
            missing: missing.to_vec(),
        }
    }
}

impl From<Miss> for CardError {
    fn from(miss: Miss) -> Self {
        CardError::Lex {
            dialect: miss.dialect,
            missing: miss.missing,
        }
    }
}

/// One card layout
pub trait ZoneStrategy: Send + Sync {
    /// Layout this strategy recognizes
    fn dialect(&self) -> Dialect;

    /// Locate tagline, citation and body in `raw`
    fn locate<'a>(&self, raw: &'a str) -> Result<Zones<'a>, Miss>;
}

/// `[BOLD: ...]` / `[SOURCE: ...]` markers
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketMarkers;

impl ZoneStrategy for BracketMarkers {
    fn dialect(&self) -> Dialect {
        Dialect::BracketMarkers
    }

    fn locate<'a>(&self, raw: &'a str) -> Result<Zones<'a>, Miss> {
        let bold = capture_marker(raw, BOLD_MARKER, 0);
        // SOURCE must come after BOLD in document order
        let source = bold.and_then(|(_, bold_end)| capture_marker(raw, SOURCE_MARKER, bold_end));

        match (bold, source) {
            (Some((tagline, _)), Some((citation, source_end))) => Ok(Zones {
                dialect: Dialect::BracketMarkers,
                tagline,
                citation,
                body: &raw[source_end..],
            }),
            (Some(_), None) => Err(Miss::new(Dialect::BracketMarkers, &[Zone::Citation])),
            (None, _) => Err(Miss::new(
                Dialect::BracketMarkers,
                &[Zone::Tagline, Zone::Citation],
            )),
        }
    }
}

/// Find `marker` at or after `from` and capture up to the first `]`
///
/// Returns the captured text and the byte offset just past the `]`.
fn capture_marker<'a>(raw: &'a str, marker: &str, from: usize) -> Option<(&'a str, usize)> {
    let start = from + raw[from..].find(marker)?;
    let content_start = start + marker.len();
    let close = content_start + raw[content_start..].find(']')?;
    Some((&raw[content_start..close], close + 1))
}

/// Line-oriented layout: tagline line, citation block, body
#[derive(Debug, Clone, Default)]
pub struct CitationBlock {
    /// Cutter initials that may trail the citation on their own line
    pub cutter_initials: Option<String>,
}

impl CitationBlock {
    pub fn with_cutter_initials(initials: impl Into<String>) -> Self {
        Self {
            cutter_initials: Some(initials.into()),
        }
    }

    fn is_initials_line(&self, line: &Line<'_>) -> bool {
        match &self.cutter_initials {
            Some(initials) if !initials.trim().is_empty() => {
                line.text.trim().eq_ignore_ascii_case(initials.trim())
            }
            _ => false,
        }
    }
}

impl ZoneStrategy for CitationBlock {
    fn dialect(&self) -> Dialect {
        Dialect::CitationBlock
    }

    fn locate<'a>(&self, raw: &'a str) -> Result<Zones<'a>, Miss> {
        let lines: Vec<Line<'a>> = split_lines(raw)
            .filter(|line| !line.text.trim().is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(Miss::new(
                Dialect::CitationBlock,
                &[Zone::Tagline, Zone::Citation, Zone::Body],
            ));
        };

        if looks_like_citation(first.text) {
            return Err(Miss::new(Dialect::CitationBlock, &[Zone::Tagline]));
        }

        if lines.len() < 2 {
            return Err(Miss::new(
                Dialect::CitationBlock,
                &[Zone::Citation, Zone::Body],
            ));
        }

        // First closing bracket ends the citation, so brackets in the body
        // are never swallowed
        let Some(close) = lines[1..].iter().position(|line| line.text.contains(']')) else {
            return Err(Miss::new(Dialect::Legacy, &[Zone::Citation]));
        };

        let mut last = 1 + close;
        if lines.get(last + 1).is_some_and(|line| self.is_initials_line(line)) {
            last += 1;
        }

        let citation_start = lines[1].start;
        let citation_end = lines[last].start + lines[last].text.len();

        Ok(Zones {
            dialect: Dialect::CitationBlock,
            tagline: tagline_text(first.text),
            citation: &raw[citation_start..citation_end],
            body: &raw[lines[last].end..],
        })
    }
}

/// A line of raw text with its byte range
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// Line content without the line ending
    text: &'a str,
    start: usize,
    /// Offset just past the line ending
    end: usize,
}

fn split_lines(raw: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    raw.split_inclusive('\n').map(move |piece| {
        let start = offset;
        offset += piece.len();
        let text = piece
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t))
            .unwrap_or(piece);
        Line {
            text,
            start,
            end: offset,
        }
    })
}

fn is_bold_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(BOLD_MARKER) && line.ends_with(']')
}

/// A `[SOURCE:` marker or any `[...]` pair, unless it is a `[BOLD: ...]` line
fn looks_like_citation(line: &str) -> bool {
    if is_bold_line(line) {
        return false;
    }
    if line.contains(SOURCE_MARKER) {
        return true;
    }
    match line.find('[') {
        Some(open) => line[open..].contains(']'),
        None => false,
    }
}

/// Unwrap a `[BOLD: ...]` line and surrounding `**` markdown bold
fn tagline_text(line: &str) -> &str {
    let mut text = line.trim();
    if is_bold_line(text) {
        text = &text[BOLD_MARKER.len()..text.len() - 1];
    }
    text.trim()
        .trim_start_matches("**")
        .trim_end_matches("**")
        .trim()
}

/// Ordered chain of zone strategies
pub struct Lexer {
    strategies: Vec<Box<dyn ZoneStrategy>>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    /// Bracket markers first, then the citation block layout
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(BracketMarkers), Box::new(CitationBlock::default())],
        }
    }

    /// Default chain with cutter initials recognized after the citation
    pub fn with_cutter_initials(initials: Option<String>) -> Self {
        let block = CitationBlock {
            cutter_initials: initials,
        };
        Self {
            strategies: vec![Box::new(BracketMarkers), Box::new(block)],
        }
    }

    /// Append a strategy after the existing ones
    pub fn push(&mut self, strategy: impl ZoneStrategy + 'static) -> &mut Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Dialects in the order they are tried
    pub fn dialects(&self) -> Vec<Dialect> {
        self.strategies.iter().map(|s| s.dialect()).collect()
    }

    /// Locate the zones of `raw`
    ///
    /// Fails with the diagnostics of the last strategy tried.
    pub fn lex<'a>(&self, raw: &'a str) -> Result<Zones<'a>, CardError> {
        let mut last_miss = None;

        for strategy in &self.strategies {
            match strategy.locate(raw) {
                Ok(zones) => {
                    debug!(dialect = %zones.dialect, "Card zones located");
                    return Ok(zones);
                }
                Err(miss) => {
                    debug!(
                        dialect = %strategy.dialect(),
                        missing = ?miss.missing,
                        "Dialect did not match"
                    );
                    last_miss = Some(miss);
                }
            }
        }

        let miss = last_miss.unwrap_or_else(|| {
            Miss::new(Dialect::Legacy, &[Zone::Tagline, Zone::Citation, Zone::Body])
        });
        Err(miss.into())
    }

    /// Lex then normalize
    pub fn parse(&self, raw: &str) -> Result<EvidenceCard, CardError> {
        let zones = self.lex(raw)?;
        normalize(&zones)
    }
}

/// Locate zones with the default strategy chain
pub fn lex(raw: &str) -> Result<Zones<'_>, CardError> {
    Lexer::new().lex(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_markers_zones() {
        let raw = "[BOLD: Tag here.][SOURCE: Smith 24]\nBody text.";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.dialect, Dialect::BracketMarkers);
        assert_eq!(zones.tagline, " Tag here.");
        assert_eq!(zones.citation, " Smith 24");
        assert_eq!(zones.body, "\nBody text.");
    }

    #[test]
    fn test_bracket_markers_body_keeps_nested_markers() {
        let raw = "[BOLD: T]\n[SOURCE: S]\nA [highlight(b)] c";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.body, "\nA [highlight(b)] c");
    }

    #[test]
    fn test_source_before_bold_is_not_bracket_dialect() {
        let result = BracketMarkers.locate("[SOURCE: S]\n[BOLD: T]\nbody");
        let miss = result.unwrap_err();
        assert_eq!(miss.missing, vec![Zone::Citation]);
    }

    #[test]
    fn test_citation_block_layout() {
        let raw = "Joining the Single Market takes over a decade.\n\
                   McGee 24 [Luke McGee; journalist, 10-28-2024, \"Sorry Rejoiners\", Prospect, https://p.co/x, DOA: 8-31-2025] shaan\n\
                   \n\
                   The UK [highlight(cannot rejoin quickly)].";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.dialect, Dialect::CitationBlock);
        assert_eq!(zones.tagline, "Joining the Single Market takes over a decade.");
        assert!(zones.citation.starts_with("McGee 24 [Luke McGee;"));
        assert!(zones.citation.ends_with("] shaan"));
        assert_eq!(zones.body, "\nThe UK [highlight(cannot rejoin quickly)].");
    }

    #[test]
    fn test_first_closing_bracket_ends_citation() {
        let raw = "Tag\nSmith 24 [cite]\nBody with [1] footnote and [another].";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.citation, "Smith 24 [cite]");
        assert_eq!(zones.body, "Body with [1] footnote and [another].");
    }

    #[test]
    fn test_multiline_citation_block() {
        let raw = "Tag\nSmith 24\n[Jane Smith; Professor,\n2024, Journal]\nBody";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.citation, "Smith 24\n[Jane Smith; Professor,\n2024, Journal]");
        assert_eq!(zones.body, "Body");
    }

    #[test]
    fn test_cutter_initials_line_joins_citation() {
        let raw = "Tag\nSmith 24 [Jane Smith, 2024]\nshaan\nBody";
        let lexer = Lexer::with_cutter_initials(Some("Shaan".to_string()));
        let zones = lexer.lex(raw).unwrap();
        assert_eq!(zones.citation, "Smith 24 [Jane Smith, 2024]\nshaan");
        assert_eq!(zones.body, "Body");

        // Without configured initials the line is body
        let zones = lex(raw).unwrap();
        assert_eq!(zones.body, "shaan\nBody");
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = "Tag\r\nSmith [2024]\r\nBody line\r\n";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.tagline, "Tag");
        assert_eq!(zones.citation, "Smith [2024]");
        assert_eq!(zones.body, "Body line\r\n");
    }

    #[test]
    fn test_markdown_bold_tagline_unwrapped() {
        let raw = "**Tariffs raise prices**\nDoe 23 [cite]\nBody";
        assert_eq!(lex(raw).unwrap().tagline, "Tariffs raise prices");
    }

    #[test]
    fn test_bold_line_without_source_uses_citation_block() {
        let raw = "[BOLD: Tariffs raise prices]\nDoe 23 [cite]\nBody";
        let zones = lex(raw).unwrap();
        assert_eq!(zones.dialect, Dialect::CitationBlock);
        assert_eq!(zones.tagline, "Tariffs raise prices");
    }

    #[test]
    fn test_citation_like_first_line_is_not_tagline() {
        let err = lex("Doe 23 [cite]\nBody\nMore").unwrap_err();
        assert_eq!(
            err,
            CardError::Lex {
                dialect: Dialect::CitationBlock,
                missing: vec![Zone::Tagline],
            }
        );
    }

    #[test]
    fn test_no_closing_bracket_reports_legacy_layout() {
        let err = lex("Tagline\nBody only\nno citation").unwrap_err();
        assert_eq!(
            err,
            CardError::Lex {
                dialect: Dialect::Legacy,
                missing: vec![Zone::Citation],
            }
        );
    }

    #[test]
    fn test_single_line_fails() {
        let err = lex("Just a plain sentence with no markers.").unwrap_err();
        assert!(matches!(err, CardError::Lex { .. }));
    }

    #[test]
    fn test_blank_input_fails_with_all_zones() {
        let err = lex("  \n\n ").unwrap_err();
        assert_eq!(
            err,
            CardError::Lex {
                dialect: Dialect::CitationBlock,
                missing: vec![Zone::Tagline, Zone::Citation, Zone::Body],
            }
        );
    }

    struct AlwaysMiss;

    impl ZoneStrategy for AlwaysMiss {
        fn dialect(&self) -> Dialect {
            Dialect::Legacy
        }

        fn locate<'a>(&self, _raw: &'a str) -> Result<Zones<'a>, Miss> {
            Err(Miss::new(Dialect::Legacy, &[Zone::Body]))
        }
    }

    #[test]
    fn test_pushed_strategy_runs_last() {
        let mut lexer = Lexer::new();
        lexer.push(AlwaysMiss);
        assert_eq!(
            lexer.dialects(),
            vec![Dialect::BracketMarkers, Dialect::CitationBlock, Dialect::Legacy]
        );

        // Earlier strategies still win
        assert!(lexer.lex("[BOLD: a][SOURCE: b]c").is_ok());

        // Diagnostics come from the last strategy
        let err = lexer.lex("one line").unwrap_err();
        assert_eq!(
            err,
            CardError::Lex {
                dialect: Dialect::Legacy,
                missing: vec![Zone::Body],
            }
        );
    }
}
