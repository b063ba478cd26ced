//! Extract the card text from a generation payload.
//!
//! The cutting prompt asks for a JSON object with a `card` property, but
//! models do not always comply. Accepted shapes, tried in order:
//! 1. A ` ```json` (or bare ` ``` `) fenced block holding `{"card": "..."}`
//! 2. The whole output as `{"card": "..."}`
//! 3. Anything else: the output itself is the card text

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CardPayload {
    card: String,
}

/// Return the card text carried by `output`
pub fn extract_card_payload(output: &str) -> String {
    if let Some(card) = fenced_blocks(output).find_map(|block| parse_payload(&block)) {
        return card;
    }

    if let Some(card) = parse_payload(output) {
        return card;
    }

    output.trim().to_string()
}

fn parse_payload(text: &str) -> Option<String> {
    serde_json::from_str::<CardPayload>(text.trim())
        .ok()
        .map(|payload| payload.card)
}

/// Contents of every fenced code block, in order
fn fenced_blocks(output: &str) -> impl Iterator<Item = String> + '_ {
    let mut lines = output.lines();
    std::iter::from_fn(move || {
        // Find the next opening fence
        lines.by_ref().find(|line| line.trim_start().starts_with("```"))?;

        let mut block = String::new();
        for line in lines.by_ref() {
            if line.trim() == "```" {
                return Some(block);
            }
            block.push_str(line);
            block.push('\n');
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_object() {
        let output = r#"{"card": "[BOLD: Tag]\n[SOURCE: Cite]\nBody"}"#;
        assert_eq!(
            extract_card_payload(output),
            "[BOLD: Tag]\n[SOURCE: Cite]\nBody"
        );
    }

    #[test]
    fn test_fenced_json_block() {
        let output = "Here is your card:\n```json\n{\"card\": \"Tag\\nCite [x]\\nBody\"}\n```\n";
        assert_eq!(extract_card_payload(output), "Tag\nCite [x]\nBody");
    }

    #[test]
    fn test_raw_text_fallback() {
        let output = "\nTag\nSmith 24 [cite]\nBody\n";
        assert_eq!(extract_card_payload(output), "Tag\nSmith 24 [cite]\nBody");
    }

    #[test]
    fn test_json_without_card_is_raw_text() {
        let output = r#"{"text": "nope"}"#;
        assert_eq!(extract_card_payload(output), output);
    }
}
