//! Command-line interface for eloquent.
//!
//! Provides commands for parsing and rendering generated cards, cutting
//! new cards from articles, and browsing the card history.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::card::{
    export_card, render_highlights, spans_to_html, CitationFields, EvidenceCard, Lexer,
    RenderedBody, DEFAULT_HIGHLIGHT_COLOR,
};
use crate::config;
use crate::core::{ArticleSource, CardCutter, CutError, CutRequest, SafetyLimits};
use crate::history::{HistoryEntry, HistoryStore};

pub mod history;

/// eloquent - Debate evidence card cutter
#[derive(Parser, Debug)]
#[command(name = "eloquent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a generated card into claim, citation and quote
    Parse {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Cutter initials that may follow the citation (defaults to config)
        #[arg(long)]
        initials: Option<String>,
    },

    /// Render a generated card (or a bare body) for the clipboard
    Render {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: RenderFormat,

        /// Treat the input as card body text only
        #[arg(long)]
        body: bool,

        /// Highlight background color (defaults to config)
        #[arg(long)]
        color: Option<String>,
    },

    /// Cut a card from an article
    Cut {
        /// Argument the card should support
        argument: String,

        /// Article URL
        #[arg(long, conflicts_with = "input")]
        url: Option<String>,

        /// Article text file (reads from stdin if neither --url nor --input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        citation: CitationArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Do not save the card to history
        #[arg(long)]
        no_save: bool,
    },

    /// Browse saved cards
    History {
        #[command(subcommand)]
        command: history::HistoryCommands,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Output format for parsed cards
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON object
    Json,
}

/// Output format for rendered cards
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RenderFormat {
    /// Rich text with highlight spans
    Html,
    /// Plain text, markers removed
    Plain,
    /// JSON array of spans
    Spans,
}

/// Structured citation details
#[derive(clap::Args, Debug, Default)]
pub struct CitationArgs {
    /// Article author
    #[arg(long)]
    pub author: Option<String>,

    /// Article title
    #[arg(long)]
    pub title: Option<String>,

    /// Publication name
    #[arg(long)]
    pub publication: Option<String>,

    /// Publication date
    #[arg(long)]
    pub date: Option<String>,

    /// Source URL for pasted article text
    #[arg(long)]
    pub source_url: Option<String>,
}

impl CitationArgs {
    /// Citation fields entered on the command line
    ///
    /// The article URL only completes a hand-entered citation. On its own
    /// it leaves the fields empty so the generated citation is shown.
    fn into_fields(self, url: Option<&str>) -> CitationFields {
        let mut fields = CitationFields {
            author: self.author,
            title: self.title,
            publication: self.publication,
            date: self.date,
            url: self.source_url,
        };
        if fields.url.is_none() && !fields.is_empty() {
            fields.url = url.map(str::to_string);
        }
        fields
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Parse {
                input,
                format,
                initials,
            } => parse_command(input, format, initials),
            Commands::Render {
                input,
                format,
                body,
                color,
            } => render_command(input, format, body, color),
            Commands::Cut {
                argument,
                url,
                input,
                citation,
                format,
                no_save,
            } => cut_command(argument, url, input, citation, format, no_save).await,
            Commands::History { command } => history::execute(command),
            Commands::Config => show_config(),
        }
    }
}

/// Read input from a file, or from stdin when it is piped
fn read_input(input_file: Option<&Path>) -> Result<String> {
    let input = if let Some(path) = input_file {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    if input.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }

    Ok(input)
}

/// Cutter initials from the flag, falling back to config
fn resolve_initials(flag: Option<String>) -> Result<Option<String>> {
    match flag {
        Some(initials) => Ok(Some(initials)),
        None => Ok(config::config()?.cutting.cutter_initials.clone()),
    }
}

fn parse_raw(raw: &str, initials: Option<String>) -> Result<EvidenceCard> {
    Lexer::with_cutter_initials(initials)
        .parse(raw)
        .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))
}

/// Execute the `parse` command
fn parse_command(
    input: Option<PathBuf>,
    format: OutputFormat,
    initials: Option<String>,
) -> Result<()> {
    let raw = read_input(input.as_deref())?;
    let card = parse_raw(&raw, resolve_initials(initials)?)?;
    let rendered = render_highlights(&card.quote);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "card": &card,
                "spans": &rendered.spans,
                "anomalies": &rendered.anomalies,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => print_card(&card, &card.citation, &rendered),
    }

    warn_anomalies(&rendered);
    Ok(())
}

/// Execute the `render` command
fn render_command(
    input: Option<PathBuf>,
    format: RenderFormat,
    body_only: bool,
    color: Option<String>,
) -> Result<()> {
    let raw = read_input(input.as_deref())?;
    let color = match color {
        Some(color) => color,
        None => config::config()
            .map(|cfg| cfg.cutting.highlight_color.clone())
            .unwrap_or_else(|_| DEFAULT_HIGHLIGHT_COLOR.to_string()),
    };

    let rendered = if body_only {
        let rendered = render_highlights(&raw);
        match format {
            RenderFormat::Html => println!("{}", spans_to_html(&rendered.spans, &color)),
            RenderFormat::Plain => println!("{}", rendered.text()),
            RenderFormat::Spans => println!("{}", serde_json::to_string_pretty(&rendered.spans)?),
        }
        rendered
    } else {
        let card = parse_raw(&raw, resolve_initials(None)?)?;
        let rendered = render_highlights(&card.quote);
        match format {
            RenderFormat::Html => println!("{}", export_card(&card, &card.citation, &color).html),
            RenderFormat::Plain => println!("{}", export_card(&card, &card.citation, &color).plain),
            RenderFormat::Spans => println!("{}", serde_json::to_string_pretty(&rendered.spans)?),
        }
        rendered
    };

    warn_anomalies(&rendered);
    Ok(())
}

/// Execute the `cut` command
async fn cut_command(
    argument: String,
    url: Option<String>,
    input: Option<PathBuf>,
    citation: CitationArgs,
    format: OutputFormat,
    no_save: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let cutter = CardCutter::from_config(cfg);

    let source = match &url {
        Some(url) => ArticleSource::Url(url.clone()),
        None => {
            if let Some(path) = &input {
                cutter.limits().validate_path(path)?;
            }
            ArticleSource::Text(read_input(input.as_deref())?)
        }
    };

    let request = CutRequest {
        argument: argument.clone(),
        source,
        citation: citation.into_fields(url.as_deref()),
    };

    eprintln!("✂️  Cutting card...");
    let outcome = match cutter.cut(&request).await {
        Ok(outcome) => outcome,
        Err(CutError::Parse(e)) => {
            anyhow::bail!("{} ({})", e.user_message(), e)
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "card": &outcome.card,
                "citation_line": &outcome.citation_line,
                "spans": &outcome.rendered.spans,
                "anomalies": &outcome.rendered.anomalies,
                "raw_sha256": &outcome.raw_sha256,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => print_card(&outcome.card, &outcome.citation_line, &outcome.rendered),
    }
    warn_anomalies(&outcome.rendered);

    if !no_save {
        let store = HistoryStore::open_default()?;
        let entry = HistoryEntry::new(
            argument,
            url,
            outcome.card,
            request.citation,
            outcome.raw_sha256,
        );
        store.append(&entry)?;
        eprintln!("📚 Saved to history: {}", &entry.id.to_string()[..8]);
    }

    Ok(())
}

/// Print a card in human-readable form
fn print_card(card: &EvidenceCard, citation_line: &str, rendered: &RenderedBody) {
    println!("Claim:    {}", card.claim);
    println!("Citation: {}", citation_line);
    println!("Dialect:  {}", card.dialect);
    println!();
    println!("{}", rendered.text());

    let highlights: Vec<&str> = rendered.emphasized().map(|s| s.text.as_str()).collect();
    if !highlights.is_empty() {
        println!();
        println!("Read aloud: {}", highlights.join(" … "));
    }
}

fn warn_anomalies(rendered: &RenderedBody) {
    if rendered.has_anomalies() {
        eprintln!(
            "⚠️  {} unterminated highlight marker(s) kept as plain text; check the card body",
            rendered.anomalies.len()
        );
    }
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Eloquent Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  History: {}", config::history_path()?.display());
    println!();
    println!("Cutting:");
    println!(
        "  Cutter initials: {}",
        cfg.cutting.cutter_initials.as_deref().unwrap_or("(none)")
    );
    println!("  Highlight color: {}", cfg.cutting.highlight_color);
    println!(
        "  Fabric pattern:  {}",
        cfg.cutting.pattern.as_deref().unwrap_or("(raw prompt)")
    );
    println!();
    print_limits(&cfg.safety);

    Ok(())
}

fn print_limits(limits: &SafetyLimits) {
    println!("Safety limits:");
    println!("  Timeout:         {}s", limits.timeout_seconds);
    println!("  Max input size:  {} bytes", limits.max_input_bytes);
    println!("  Max output size: {} bytes", limits.max_output_bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_cut_command() {
        let cli = Cli::try_parse_from([
            "eloquent",
            "cut",
            "Economic growth is slowing in Europe.",
            "--url",
            "https://example.com/a",
            "--author",
            "Jane Doe",
            "--no-save",
        ])
        .unwrap();

        match cli.command {
            Commands::Cut {
                argument,
                url,
                citation,
                no_save,
                ..
            } => {
                assert_eq!(argument, "Economic growth is slowing in Europe.");
                assert_eq!(url.as_deref(), Some("https://example.com/a"));
                assert!(no_save);
                let fields = citation.into_fields(url.as_deref());
                assert_eq!(fields.author.as_deref(), Some("Jane Doe"));
                assert_eq!(fields.url.as_deref(), Some("https://example.com/a"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_url_alone_keeps_generated_citation() {
        let cli = Cli::try_parse_from([
            "eloquent",
            "cut",
            "Economic growth is slowing.",
            "--url",
            "https://ex.com/a",
        ])
        .unwrap();

        let Commands::Cut { url, citation, .. } = cli.command else {
            panic!("expected cut command");
        };
        let fields = citation.into_fields(url.as_deref());
        assert!(fields.is_empty());

        let parsed = "McGee 24 [Luke McGee; journalist, 10-28-2024, Prospect, https://ex.com/a]";
        assert_eq!(fields.resolve(parsed), parsed);
    }

    #[test]
    fn test_explicit_source_url_overrides() {
        let cli = Cli::try_parse_from([
            "eloquent",
            "cut",
            "Economic growth is slowing.",
            "--source-url",
            "https://ex.com/b",
        ])
        .unwrap();

        let Commands::Cut { url, citation, .. } = cli.command else {
            panic!("expected cut command");
        };
        let fields = citation.into_fields(url.as_deref());
        assert_eq!(fields.resolve("Generated cite [x]"), "https://ex.com/b");
    }

    #[test]
    fn test_url_conflicts_with_input() {
        let result = Cli::try_parse_from([
            "eloquent",
            "cut",
            "Economic growth is slowing in Europe.",
            "--url",
            "https://example.com/a",
            "--input",
            "article.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_raw_reports_retry_message() {
        let err = parse_raw("one line only", None).unwrap_err();
        assert!(err.to_string().starts_with(crate::card::RETRY_MESSAGE));
    }
}
