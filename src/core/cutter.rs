//! Card cutting workflow.
//!
//! One cut = one generation call:
//! validate request -> build prompt -> generate -> extract payload ->
//! parse card -> render highlights -> resolve citation line.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::adapters::{Adapter, FabricAdapter};
use crate::card::{render_highlights, CardError, CitationFields, EvidenceCard, Lexer, RenderedBody};
use crate::config::ResolvedConfig;
use crate::history::compute_hash;

use super::payload::extract_card_payload;
use super::prompt::build_prompt;
use super::safety::{SafetyLimits, SafetyViolation};

/// Minimum argument length in characters
pub const MIN_ARGUMENT_CHARS: usize = 10;

/// Minimum pasted article length in characters
pub const MIN_ARTICLE_CHARS: usize = 50;

/// Where the article comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleSource {
    /// Pasted article text
    Text(String),
    /// Article URL, read by the generator
    Url(String),
}

/// A request to cut one card
#[derive(Debug, Clone)]
pub struct CutRequest {
    /// Argument the card should support (becomes the tagline)
    pub argument: String,
    pub source: ArticleSource,
    /// Citation details entered by the user, override the generated citation
    pub citation: CitationFields,
}

impl CutRequest {
    /// Check the request before anything is sent to the generator
    pub fn validate(&self) -> Result<(), CutError> {
        if self.argument.trim().chars().count() < MIN_ARGUMENT_CHARS {
            return Err(CutError::InvalidRequest(format!(
                "Argument must be at least {} characters",
                MIN_ARGUMENT_CHARS
            )));
        }

        match &self.source {
            ArticleSource::Text(text) => {
                if text.trim().chars().count() < MIN_ARTICLE_CHARS {
                    return Err(CutError::InvalidRequest(format!(
                        "Article text must be at least {} characters",
                        MIN_ARTICLE_CHARS
                    )));
                }
            }
            ArticleSource::Url(url) => {
                let url = url.trim();
                let has_host = url
                    .strip_prefix("https://")
                    .or_else(|| url.strip_prefix("http://"))
                    .is_some_and(|rest| !rest.is_empty());
                if !has_host {
                    return Err(CutError::InvalidRequest(format!(
                        "Please provide a valid source URL: {}",
                        url
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A successfully cut card
#[derive(Debug, Clone)]
pub struct CutOutcome {
    pub card: EvidenceCard,
    /// Card body split into highlight spans
    pub rendered: RenderedBody,
    /// Citation to display: user fields if given, else the parsed citation
    pub citation_line: String,
    /// Raw card text as generated
    pub raw: String,
    /// Hash of the raw card text
    pub raw_sha256: String,
}

/// Card cutting errors
#[derive(Debug, Error)]
pub enum CutError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Safety(#[from] SafetyViolation),

    #[error("Generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("No evidence could be extracted. Try refining your argument or using a different article.")]
    EmptyOutput,

    #[error(transparent)]
    Parse(#[from] CardError),
}

/// Cuts cards through a text generation adapter
pub struct CardCutter {
    adapter: Arc<dyn Adapter>,
    limits: SafetyLimits,
    /// Generator pattern; `None` sends the prompt as-is
    pattern: Option<String>,
    lexer: Lexer,
    cutter_initials: Option<String>,
}

impl CardCutter {
    /// Create a cutter with default limits and no cutter initials
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter,
            limits: SafetyLimits::default(),
            pattern: None,
            lexer: Lexer::new(),
            cutter_initials: None,
        }
    }

    /// Create a Fabric-backed cutter from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let adapter = match &config.cutting.fabric_binary {
            Some(path) => FabricAdapter::with_binary_path(path.clone()),
            None => FabricAdapter::new(),
        };

        Self::new(Arc::new(adapter))
            .with_limits(config.safety.clone())
            .with_pattern(config.cutting.pattern.clone())
            .with_cutter_initials(config.cutting.cutter_initials.clone())
    }

    pub fn with_limits(mut self, limits: SafetyLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern.filter(|p| !p.trim().is_empty());
        self
    }

    /// Initials used in the prompt and recognized after the citation
    pub fn with_cutter_initials(mut self, initials: Option<String>) -> Self {
        self.lexer = Lexer::with_cutter_initials(initials.clone());
        self.cutter_initials = initials;
        self
    }

    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }

    /// Cut one card
    #[instrument(skip(self, request), fields(adapter = %self.adapter.name()))]
    pub async fn cut(&self, request: &CutRequest) -> Result<CutOutcome, CutError> {
        request.validate()?;

        let prompt = build_prompt(request, self.cutter_initials.as_deref());
        self.limits.validate_input(&prompt)?;

        let action = self.pattern.as_deref().unwrap_or("");
        let timeout = self.limits.timeout();
        let started = Instant::now();
        info!(prompt_bytes = prompt.len(), "Requesting card generation");

        let output = tokio::time::timeout(timeout, self.adapter.execute(action, &prompt, timeout))
            .await
            .map_err(|_| CutError::Timeout {
                seconds: self.limits.timeout_seconds,
            })?
            .map_err(CutError::Generation)?;

        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            output_bytes = output.content.len(),
            "Generation completed"
        );
        self.limits.validate_output(&output.content)?;

        let raw = extract_card_payload(&output.content);
        if raw.is_empty() {
            return Err(CutError::EmptyOutput);
        }

        let card = self.lexer.parse(&raw).inspect_err(|e| {
            warn!(error = %e, "Generated card could not be parsed");
        })?;

        let rendered = render_highlights(&card.quote);
        let citation_line = request.citation.resolve(&card.citation);
        let raw_sha256 = compute_hash(raw.as_bytes());

        Ok(CutOutcome {
            card,
            rendered,
            citation_line,
            raw,
            raw_sha256,
        })
    }
}
