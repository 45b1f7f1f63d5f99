//! Fenced-block extraction from model output.
//!
//! Two consumers: the session recovers the last executed SQL from a
//! ```sql block when the handle recorded nothing this turn, and the
//! presentation layer pulls a ```json block out of the answer to render as
//! a table, showing the remaining text on its own. Extraction is
//! best-effort by design; a miss is a valid outcome.

use serde_json::{Map, Value as JsonValue};

/// Find the first fenced block of the given language and return its body.
pub fn extract_fenced(text: &str, lang: &str) -> Option<String> {
    let opener = format!("```{}", lang);
    let start = text.find(&opener)? + opener.len();
    let rest = text.get(start..)?;

    // The fence label must end the line; "```sqlite" is not a "```sql" block.
    let after_label = rest.strip_prefix('\n').or_else(|| {
        rest.strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix(' ').map(|r| r.trim_start_matches(['\r', '\n'])))
    })?;

    let end = after_label.find("```")?;
    Some(after_label[..end].trim().to_string())
}

/// Pull a fenced `json` block out of the answer as tabular data.
///
/// Returns the parsed array of row mappings plus the text with the block
/// removed. `None` when there is no block or it does not parse as an array
/// of objects.
pub fn extract_json_table(text: &str) -> Option<(Vec<Map<String, JsonValue>>, String)> {
    let body = extract_fenced(text, "json")?;
    let rows: Vec<Map<String, JsonValue>> = match serde_json::from_str::<JsonValue>(&body) {
        Ok(JsonValue::Array(values)) => values
            .into_iter()
            .map(|v| match v {
                JsonValue::Object(map) => Some(map),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };

    // Strip the whole fenced block (opener line through closing fence).
    let opener = text.find("```json")?;
    let after_opener = &text[opener + "```json".len()..];
    let close_rel = after_opener.find("```")?;
    let close = opener + "```json".len() + close_rel + "```".len();
    let stripped = format!("{}{}", &text[..opener], &text[close..])
        .trim()
        .to_string();

    Some((rows, stripped))
}
