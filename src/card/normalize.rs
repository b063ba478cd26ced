//! Turn lexed zones into an [`EvidenceCard`]
//!
//! Only surrounding whitespace is removed. Citation and body wording is
//! kept verbatim: a cut card must quote its source exactly.

use super::error::CardError;
use super::lexer::Lexer;
use super::types::{EvidenceCard, Zone, Zones};

/// Trim each zone and reject any that end up empty
///
/// Fields are checked in card order: claim, citation, quote.
pub fn normalize(zones: &Zones<'_>) -> Result<EvidenceCard, CardError> {
    let claim = non_empty(zones.tagline, Zone::Tagline)?;
    let citation = non_empty(zones.citation, Zone::Citation)?;
    let quote = non_empty(zones.body, Zone::Body)?;

    Ok(EvidenceCard {
        claim: claim.to_string(),
        citation: citation.to_string(),
        quote: quote.to_string(),
        dialect: zones.dialect,
    })
}

fn non_empty(text: &str, zone: Zone) -> Result<&str, CardError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(CardError::EmptyField { zone })
    } else {
        Ok(trimmed)
    }
}

/// Parse a raw generated card with the default dialect chain
pub fn parse_card(raw: &str) -> Result<EvidenceCard, CardError> {
    Lexer::new().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::types::Dialect;

    fn zones<'a>(tagline: &'a str, citation: &'a str, body: &'a str) -> Zones<'a> {
        Zones {
            dialect: Dialect::BracketMarkers,
            tagline,
            citation,
            body,
        }
    }

    #[test]
    fn test_trims_every_field() {
        let card = normalize(&zones("  Claim. ", "\n Cite \n", "\n\nBody  text.\n")).unwrap();
        assert_eq!(card.claim, "Claim.");
        assert_eq!(card.citation, "Cite");
        assert_eq!(card.quote, "Body  text.");
        assert_eq!(card.dialect, Dialect::BracketMarkers);
    }

    #[test]
    fn test_inner_content_untouched() {
        let body = "Line one.\n\n  Indented [highlight(two)].";
        let card = normalize(&zones("c", "s", body)).unwrap();
        assert_eq!(card.quote, body);
    }

    #[test]
    fn test_normalizing_trimmed_zones_is_noop() {
        let first = normalize(&zones(" a ", " b ", " c ")).unwrap();
        let second = normalize(&zones(&first.claim, &first.citation, &first.quote)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_fields_rejected_in_order() {
        assert_eq!(
            normalize(&zones(" ", "", "")),
            Err(CardError::EmptyField { zone: Zone::Tagline })
        );
        assert_eq!(
            normalize(&zones("a", "\n", "")),
            Err(CardError::EmptyField { zone: Zone::Citation })
        );
        assert_eq!(
            normalize(&zones("a", "b", " \t ")),
            Err(CardError::EmptyField { zone: Zone::Body })
        );
    }

    #[test]
    fn test_parse_card_empty_body() {
        let err = parse_card("[BOLD: Tag][SOURCE: Cite]   ").unwrap_err();
        assert_eq!(err.to_string(), "empty field: quote");
    }
}
