//! Highlight span rendering
//!
//! Splits card body text into plain and emphasized runs. Three marker
//! dialects are recognized, ASCII case-insensitively:
//!
//! - `[highlight(text)]`, parentheses balanced inside
//! - `[HIGHLIGHT: text]`, square brackets balanced inside
//! - `<highlight>text</highlight>`
//!
//! Markers do not nest. Anything that looks like a marker inside an open
//! highlight is part of that highlight's text. An unterminated marker is
//! kept as literal text together with the rest of the body, and reported
//! as a [`HighlightAnomaly`]. Text is never dropped.

use tracing::warn;

use super::error::HighlightAnomaly;
use super::types::{HighlightDialect, HighlightSpan};

const DIALECTS: [HighlightDialect; 3] = [
    HighlightDialect::Paren,
    HighlightDialect::Colon,
    HighlightDialect::Tag,
];

const TAG_CLOSE: &str = "</highlight>";

/// Rendered body text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedBody {
    /// Runs in document order; adjacent plain text is merged
    pub spans: Vec<HighlightSpan>,
    /// Unterminated markers that were kept as literal text
    pub anomalies: Vec<HighlightAnomaly>,
}

impl RenderedBody {
    /// Body text with marker syntax removed
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Only the emphasized runs, in order
    pub fn emphasized(&self) -> impl Iterator<Item = &HighlightSpan> {
        self.spans.iter().filter(|s| s.emphasized)
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Split `body` into plain and emphasized spans
pub fn render_highlights(body: &str) -> RenderedBody {
    let mut rendered = RenderedBody::default();
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(rel) = body[pos..].find(|c: char| c == '[' || c == '<') {
        let start = pos + rel;

        let Some(dialect) = match_start(body, start) else {
            literal.push_str(&body[pos..=start]);
            pos = start + 1;
            continue;
        };

        let content_start = content_start(body, start, dialect);
        match find_close(body, content_start, dialect) {
            Some((content_end, next)) => {
                literal.push_str(&body[pos..start]);
                let captured = &body[content_start..content_end];
                if !captured.is_empty() {
                    flush_literal(&mut rendered.spans, &mut literal);
                    rendered.spans.push(HighlightSpan::emphasized(captured));
                }
                pos = next;
            }
            None => {
                warn!(
                    dialect = ?dialect,
                    offset = start,
                    "Unterminated highlight marker kept as literal text"
                );
                rendered.anomalies.push(HighlightAnomaly {
                    dialect,
                    offset: start,
                });
                break;
            }
        }
    }

    literal.push_str(&body[pos..]);
    flush_literal(&mut rendered.spans, &mut literal);
    rendered
}

/// Body text with all highlight marker syntax removed
pub fn strip_markers(body: &str) -> String {
    render_highlights(body).text()
}

fn flush_literal(spans: &mut Vec<HighlightSpan>, literal: &mut String) {
    if !literal.is_empty() {
        spans.push(HighlightSpan::plain(std::mem::take(literal)));
    }
}

fn match_start(body: &str, start: usize) -> Option<HighlightDialect> {
    DIALECTS.into_iter().find(|dialect| {
        let token = dialect.start_token();
        body.get(start..start + token.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(token))
    })
}

/// Offset of the highlighted text; one space after `[HIGHLIGHT:` is marker syntax
fn content_start(body: &str, start: usize, dialect: HighlightDialect) -> usize {
    let after = start + dialect.start_token().len();
    if dialect == HighlightDialect::Colon && body[after..].starts_with(' ') {
        after + 1
    } else {
        after
    }
}

/// Find the terminator for `dialect`
///
/// Returns the end of the highlighted text and the offset just past the
/// terminator.
fn find_close(body: &str, from: usize, dialect: HighlightDialect) -> Option<(usize, usize)> {
    let rest = &body[from..];
    match dialect {
        HighlightDialect::Paren => {
            let mut depth = 0usize;
            for (i, c) in rest.char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' if depth > 0 => depth -= 1,
                    ')' if rest[i + 1..].starts_with(']') => return Some((from + i, from + i + 2)),
                    _ => {}
                }
            }
            None
        }
        HighlightDialect::Colon => {
            let mut depth = 0usize;
            for (i, c) in rest.char_indices() {
                match c {
                    '[' => depth += 1,
                    ']' if depth > 0 => depth -= 1,
                    ']' => return Some((from + i, from + i + 1)),
                    _ => {}
                }
            }
            None
        }
        HighlightDialect::Tag => rest
            .match_indices('<')
            .map(|(i, _)| i)
            .find(|&i| {
                rest.get(i..i + TAG_CLOSE.len())
                    .is_some_and(|s| s.eq_ignore_ascii_case(TAG_CLOSE))
            })
            .map(|i| (from + i, from + i + TAG_CLOSE.len())),
    }
}
