//! Pulling answer fields out of raw model responses.
//!
//! Models are asked for a JSON object but often wrap it in a markdown fence,
//! truncate it, or embed it in prose, so extraction degrades in steps: strict
//! JSON, then a `"field": "value"` pair anywhere in the text, then the first
//! `{...}` block mentioning the field.

use regex::Regex;
use serde_json::Value;

const FENCE: &str = "```";

/// Drop a leading ```` ```lang ```` line and a trailing ```` ``` ```` line.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with(FENCE) {
        return text.to_string();
    }
    let mut lines: Vec<&str> = text.split('\n').skip(1).collect();
    if lines.last().is_some_and(|line| line.trim() == FENCE) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Trimmed string value of `field`, or `None` when no step finds it.
pub fn extract_json_field(response: &str, field: &str) -> Option<String> {
    let text = strip_code_fences(response);

    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        return string_field(&value, field);
    }

    let name = regex::escape(field);
    let pair = Regex::new(&format!(r#""{name}"\s*:\s*"([^"]*)""#)).ok()?;
    if let Some(caps) = pair.captures(&text) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }

    let object = Regex::new(&format!(r#"(?s)\{{.*?"{name}".*?\}}"#)).ok()?;
    let block = object.find(&text)?;
    let value = serde_json::from_str::<Value>(block.as_str()).ok()?;
    string_field(&value, field)
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences() {
        let cases = [
            (r#"{"answer": "B"}"#, r#"{"answer": "B"}"#),
            ("```json\n{\"answer\": \"B\"}\n```", r#"{"answer": "B"}"#),
            ("```\n{\"answer\": \"B\"}\n```", r#"{"answer": "B"}"#),
            ("  \n```json\n{\"answer\": \"B\"}\n```\n  ", r#"{"answer": "B"}"#),
            ("", ""),
            ("```json", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(strip_code_fences(input), expected, "{input:?}");
        }
    }

    #[test]
    fn reads_valid_json() {
        assert_eq!(
            extract_json_field(r#"{"answer": "B", "reasoning": "test"}"#, "answer").as_deref(),
            Some("B")
        );
        assert_eq!(
            extract_json_field("```json\n{\"answer\": \"C\"}\n```", "answer").as_deref(),
            Some("C")
        );
        assert_eq!(
            extract_json_field(r#"{"legal_basis": " Art. 123 § 2 pkt 3 k.k. "}"#, "legal_basis")
                .as_deref(),
            Some("Art. 123 § 2 pkt 3 k.k.")
        );
        assert_eq!(extract_json_field(r#"{"answer": ""}"#, "answer").as_deref(), Some(""));
    }

    #[test]
    fn missing_field_in_valid_json() {
        assert_eq!(extract_json_field(r#"{"answer": "B"}"#, "missing"), None);
        assert_eq!(extract_json_field("{}", "answer"), None);
    }

    #[test]
    fn falls_back_to_field_pattern() {
        let cases = [
            r#"{"answer": "A", "reasoning": "This is a very long..."#,
            r#"Here is my answer: "answer": "B" and that is final."#,
            r#""answer":"B""#,
            "\"answer\"\n:\n\"B\"",
        ];
        for response in cases {
            assert!(extract_json_field(response, "answer").is_some(), "{response:?}");
        }
        assert_eq!(extract_json_field(cases[0], "answer").as_deref(), Some("A"));
    }

    #[test]
    fn falls_back_to_embedded_object() {
        let response = r#"Response: {"answer": "B", "legal_basis": "Art. 1"} done"#;
        assert_eq!(extract_json_field(response, "answer").as_deref(), Some("B"));
        assert_eq!(extract_json_field(response, "legal_basis").as_deref(), Some("Art. 1"));
    }

    #[test]
    fn object_fallback_handles_non_string_pairs() {
        let response = r#"Wynik: {"confidence": 0.9, "answer": 3} koniec"#;
        assert_eq!(extract_json_field(response, "answer"), None);
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert_eq!(extract_json_field("Just random text", "answer"), None);
        assert_eq!(extract_json_field("", "answer"), None);
    }

    #[test]
    fn realistic_response() {
        let response = "```json\n{\n    \"reasoning\": \"Analiza opcji A, B, C...\",\n    \"answer\": \"B\",\n    \"legal_basis\": \"Art. 415 § 1 k.c.\",\n    \"legal_basis_content\": \"Kto z winy swojej wyrządził drugiemu szkodę...\"\n}\n```";
        assert_eq!(extract_json_field(response, "answer").as_deref(), Some("B"));
        assert_eq!(
            extract_json_field(response, "legal_basis_content").as_deref(),
            Some("Kto z winy swojej wyrządził drugiemu szkodę...")
        );
    }
}
