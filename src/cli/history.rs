//! History CLI subcommands for browsing saved cards.
//!
//! Provides commands to:
//! - `list`: Show recent cards, newest first
//! - `show`: Display one card, optionally as clipboard HTML
//! - `clear`: Remove all saved cards

use anyhow::Result;
use clap::Subcommand;

use crate::card::{export_card, render_highlights};
use crate::config;
use crate::history::HistoryStore;

/// History-related subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List saved cards
    List {
        /// Maximum number of cards to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show a saved card
    Show {
        /// Card ID (or unique prefix)
        id: String,

        /// Print clipboard HTML instead of text
        #[arg(long)]
        html: bool,
    },

    /// Remove all saved cards
    Clear,
}

/// Execute history subcommands
pub fn execute(command: HistoryCommands) -> Result<()> {
    let store = HistoryStore::open_default()?;

    match command {
        HistoryCommands::List { limit } => list(&store, limit),
        HistoryCommands::Show { id, html } => show(&store, &id, html),
        HistoryCommands::Clear => {
            store.clear()?;
            eprintln!("History cleared");
            Ok(())
        }
    }
}

fn list(store: &HistoryStore, limit: usize) -> Result<()> {
    let entries = store.list(Some(limit))?;

    if entries.is_empty() {
        println!("No saved cards");
        return Ok(());
    }

    println!("{:<10} {:<18} {}", "ID", "SAVED", "CLAIM");
    println!("{}", "-".repeat(75));

    for entry in entries {
        let claim: String = entry.card.claim.chars().take(45).collect();
        println!(
            "{:<10} {:<18} {}",
            &entry.id.to_string()[..8],
            entry.created_at.format("%Y-%m-%d %H:%M"),
            claim
        );
    }

    Ok(())
}

fn show(store: &HistoryStore, id: &str, html: bool) -> Result<()> {
    let Some(entry) = store.find(id)? else {
        anyhow::bail!("Card not found: {}", id);
    };

    let citation_line = entry.citation_line();

    if html {
        let color = config::config()?.cutting.highlight_color.clone();
        println!("{}", export_card(&entry.card, &citation_line, &color).html);
        return Ok(());
    }

    let rendered = render_highlights(&entry.card.quote);
    println!("ID:       {}", entry.id);
    println!("Saved:    {}", entry.created_at.to_rfc3339());
    println!("Argument: {}", entry.argument);
    if let Some(url) = &entry.source_url {
        println!("Source:   {}", url);
    }
    println!();
    super::print_card(&entry.card, &citation_line, &rendered);

    Ok(())
}
