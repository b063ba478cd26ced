//! Structured citation fields supplied alongside a generated card
//!
//! When a user fills in author/title/publication details by hand, those
//! take precedence over whatever citation the generated card carried.

use serde::{Deserialize, Serialize};

/// Optional citation details entered by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CitationFields {
    /// Present, non-blank fields in display order: author, date,
    /// publication, title, url
    fn present(&self) -> impl Iterator<Item = &str> {
        [
            &self.author,
            &self.date,
            &self.publication,
            &self.title,
            &self.url,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    }

    /// True when no field carries any text
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Fields joined with `", "`
    pub fn display_line(&self) -> String {
        self.present().collect::<Vec<_>>().join(", ")
    }

    /// Citation line to show for a card
    ///
    /// Structured fields override the parsed citation; with none set the
    /// parsed citation is used verbatim.
    pub fn resolve(&self, parsed: &str) -> String {
        if self.is_empty() {
            parsed.to_string()
        } else {
            self.display_line()
        }
    }
}
