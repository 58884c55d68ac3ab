use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::error::ExtractionError;
use super::record::ResearchRecord;

const FENCE: &str = "```";

/// ```` ```json ```` fence, tag case-insensitive, body up to the next fence.
static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?i:json)[ \t]*\r?\n?(.*?)```").expect("valid json fence regex")
});

/// Body of the first ```` ```json ```` block, or of the first untagged block
/// when no tagged one exists. Trimmed; anything after the closing fence is
/// ignored.
pub fn find_json_block(raw_text: &str) -> Option<&str> {
    JSON_FENCE
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .or_else(|| first_untagged_block(raw_text))
        .map(str::trim)
}

/// Fence markers pair up in order (opener, closer). The first pair whose
/// opener has an empty info string on its own line is the untagged block.
fn first_untagged_block(raw_text: &str) -> Option<&str> {
    let mut markers = raw_text.match_indices(FENCE).map(|(at, _)| at);
    while let (Some(open), Some(close)) = (markers.next(), markers.next()) {
        let inner = &raw_text[open + FENCE.len()..close];
        let Some((info, body)) = inner.split_once('\n') else {
            continue;
        };
        if info.trim().is_empty() {
            return Some(body);
        }
    }
    None
}

/// Recover a [`ResearchRecord`] from free-form model output.
///
/// Missing fields are fine; the block must hold a JSON object whose present
/// fields have the expected types.
pub fn extract(raw_text: &str) -> Result<ResearchRecord, ExtractionError> {
    let block = find_json_block(raw_text).ok_or(ExtractionError::NoBlockFound)?;
    let value: Value = serde_json::from_str(block)
        .map_err(|e| ExtractionError::MalformedJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ExtractionError::MalformedJson(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| ExtractionError::MalformedJson(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "here you go ```json\n\
        {\"topic\":\"x\",\"summary\":\"y\",\"sources\":[],\
        \"tools_used\":[\"save_to_txt_file\"]}\n```";

    #[test]
    fn extracts_scenario_record() {
        let record = extract(SCENARIO).unwrap();
        assert_eq!(record, ResearchRecord::new("x", "y", vec![], vec!["save_to_txt_file".into()]));
    }

    #[test]
    fn plain_text_has_no_block() {
        for text in [
            "The sky is blue because of Rayleigh scattering.",
            "",
            "```json\n{\"topic\":\"unterminated\"}",
        ] {
            assert_eq!(extract(text), Err(ExtractionError::NoBlockFound));
        }
    }

    #[test]
    fn trailing_comma_is_malformed() {
        let text = "```json\n{\"topic\": \"x\", \"sources\": [\"a\",],}\n```";
        assert!(matches!(extract(text), Err(ExtractionError::MalformedJson(_))));
    }

    #[test]
    fn non_object_and_wrong_types_are_malformed() {
        let err = extract("```json\n[1, 2]\n```").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MalformedJson("expected a JSON object, found an array".into())
        );
        assert!(matches!(
            extract("```json\n{\"sources\": 3}\n```"),
            Err(ExtractionError::MalformedJson(_))
        ));
    }

    #[test]
    fn partial_record_is_accepted() {
        let record = extract("```json\n{\"summary\": \"only this\"}\n```").unwrap();
        assert_eq!(record.summary.as_deref(), Some("only this"));
        assert!(!record.is_complete());
    }

    #[test]
    fn only_first_block_counts() {
        let text =
            "```json\n{\"topic\":\"first\"}\n```\nand also\n```json\n{\"topic\":\"second\"}\n```";
        assert_eq!(extract(text).unwrap().topic.as_deref(), Some("first"));

        // A broken first block is not rescued by a later valid one.
        let text = "```json\n{oops}\n```\n```json\n{\"topic\":\"second\"}\n```";
        assert!(matches!(extract(text), Err(ExtractionError::MalformedJson(_))));
    }

    #[test]
    fn tag_is_case_insensitive_and_may_share_the_line() {
        assert_eq!(extract("```JSON\n{\"topic\":\"a\"}\n```").unwrap().topic.as_deref(), Some("a"));
        assert_eq!(extract("```json {\"topic\":\"b\"} ```").unwrap().topic.as_deref(), Some("b"));
    }

    #[test]
    fn untagged_fence_is_a_fallback() {
        let record = extract("Result:\n```\n{\"topic\":\"bare\"}\n```").unwrap();
        assert_eq!(record.topic.as_deref(), Some("bare"));

        // A tagged block wins even when an untagged one comes first.
        let text = "```\nnot json\n```\n```json\n{\"topic\":\"tagged\"}\n```";
        assert_eq!(extract(text).unwrap().topic.as_deref(), Some("tagged"));

        // Other languages are not mistaken for JSON.
        assert_eq!(extract("```python\nprint(1)\n```"), Err(ExtractionError::NoBlockFound));
    }

    #[test]
    fn closing_fence_of_another_language_is_not_an_opener() {
        let text = "```python\nprint(1)\n```\nHere is the record:\n```\n{\"topic\":\"a\"}\n```";
        assert_eq!(find_json_block(text), Some("{\"topic\":\"a\"}"));
        assert_eq!(extract(text).unwrap().topic.as_deref(), Some("a"));

        let text = "```rust\nfn main() {}\n```\n```sh\nls\n```\n```\n{\"topic\":\"third\"}\n```";
        assert_eq!(extract(text).unwrap().topic.as_deref(), Some("third"));
    }

    #[test]
    fn extraction_is_idempotent() {
        for text in [SCENARIO, "no fence", "```json\n{bad\n```"] {
            assert_eq!(extract(text), extract(text));
        }
    }
}
