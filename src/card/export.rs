//! Clipboard export of a rendered card
//!
//! Produces a rich-text (HTML) form for pasting into a document editor and
//! a plain-text fallback.

use serde::Serialize;

use super::highlight::render_highlights;
use super::types::{EvidenceCard, HighlightSpan};

/// Cyan, the highlight color cards are cut with
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#00FFFF";

/// Both clipboard flavours of one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardExport {
    pub html: String,
    pub plain: String,
}

/// Export `card` with `citation_line` shown as its citation
pub fn export_card(card: &EvidenceCard, citation_line: &str, color: &str) -> ClipboardExport {
    let rendered = render_highlights(&card.quote);

    let html = format!(
        "<p><strong>{}</strong></p>\n<p>{}</p>\n<p>{}</p>",
        escape_html(&card.claim),
        escape_html(citation_line),
        spans_to_html(&rendered.spans, color),
    );

    let plain = format!("{}\n{}\n\n{}", card.claim, citation_line, rendered.text());

    ClipboardExport { html, plain }
}

/// Render spans as HTML, emphasized runs on a colored background
pub fn spans_to_html(spans: &[HighlightSpan], color: &str) -> String {
    let mut html = String::new();
    for span in spans {
        let text = escape_html(&span.text);
        if span.emphasized {
            html.push_str(&format!(
                "<span style=\"background:{}\">{}</span>",
                escape_html(color),
                text
            ));
        } else {
            html.push_str(&text);
        }
    }
    html
}

/// Escape text for HTML; newlines become `<br>`
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
