//! Parse failures and recoverable highlight anomalies

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Dialect, HighlightDialect, Zone};

/// Message shown to the user for any card parse failure
pub const RETRY_MESSAGE: &str =
    "could not parse the generated card; try again or adjust the argument";

/// A raw card that could not be turned into an [`super::EvidenceCard`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// No dialect could locate every zone
    #[error("could not locate {} ({} layout)", join_zones(.missing), .dialect)]
    Lex { dialect: Dialect, missing: Vec<Zone> },

    /// A zone was located but is blank after trimming
    #[error("empty field: {}", Zone::field_name(.zone))]
    EmptyField { zone: Zone },
}

impl CardError {
    /// Fixed, user-facing retry message
    ///
    /// Both failure kinds stem from unpredictable generation output, so they
    /// are surfaced identically.
    pub fn user_message(&self) -> &'static str {
        RETRY_MESSAGE
    }
}

fn join_zones(zones: &[Zone]) -> String {
    zones
        .iter()
        .map(Zone::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An unterminated highlight marker, recovered as literal text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightAnomaly {
    pub dialect: HighlightDialect,
    /// Byte offset of the marker start in the body
    pub offset: usize,
}
