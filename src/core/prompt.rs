//! Card cutting prompt.
//!
//! The generator is asked to return the full article with a tagline,
//! a citation line and `[highlight(...)]` markers, wrapped in a JSON
//! object with a single `card` property.

use super::cutter::{ArticleSource, CutRequest};

/// Initials appended to the citation when none are configured
const DEFAULT_INITIALS: &str = "cutter_initials";

const RULES: &str = r#"**RULE 1: Tagline Formatting (MANDATORY)**

Every card must begin with:

1. A bold, concise tagline (5-12 words) summarizing the argument.
2. On a new line, the citation: Author Last Name YY [Full Name; Credentials (if available), MM-DD-YYYY, "Article Title," Publication, Full URL (REQUIRED), DOA: MM-DD-YYYY] {initials}

Format example:
Joining the Single Market takes over a decade.
McGee 24 [Luke McGee; Emmy award-winning journalist covering European politics and diplomacy, 10-28-2024, "Sorry Rejoiners: The UK's path back to Europe will be slow," Prospect Magazine, https://www.prospectmagazine.co.uk/politics/brexit/68353/sorry-rejoinersthe-uks-path-back-to-europe-will-be-slow, DOA: 8-31-2025] {initials}

**RULE 2: Cyan Highlighting With [highlight(...)]**

All highlighting must use [highlight(...)] syntax. The highlight represents cyan (#00FFFF). Only highlight short, powerful phrases, NOT whole sentences. Highlight core claims, causal mechanisms, statistics, warrants, and impacts.

**RULE 3: Conciseness and Flow**

The highlighted phrases must read smoothly when spoken, in order, on their own.

**RULE 4: Full Article Appears Below the Cite (MANDATORY)**

Print the entire article text after the citation, verbatim. Keep the original paragraph structure. Insert [highlight(...)] markings directly into the full text. Never rephrase the article.

Your final output must be a single JSON object with a "card" property containing the fully formatted card as a string."#;

/// Render the cutting prompt for `request`
pub fn build_prompt(request: &CutRequest, cutter_initials: Option<&str>) -> String {
    let initials = cutter_initials
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INITIALS);

    let source_section = match &request.source {
        ArticleSource::Text(text) => format!("**User Provided Article Text:**\n{}", text),
        ArticleSource::Url(url) => format!(
            "**Source URL:**\n{}\n\nAccess the URL above and read the full article.",
            url
        ),
    };

    let mut prompt = String::from(
        "You are a professional debate evidence cutter. Cut one card from the article \
         below with concise, shaped highlights, professional formatting and the full \
         source text included.\n\n",
    );
    prompt.push_str(&source_section);
    prompt.push_str("\n\n**User Provided Argument (for the tagline):**\n");
    prompt.push_str(request.argument.trim());

    let known_citation = request.citation.display_line();
    if !known_citation.is_empty() {
        prompt.push_str("\n\n**Known Citation Details:**\n");
        prompt.push_str(&known_citation);
    }

    prompt.push_str("\n\n");
    prompt.push_str(&RULES.replace("{initials}", initials));
    prompt
}
