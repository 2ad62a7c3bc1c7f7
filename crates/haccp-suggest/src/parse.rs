use serde::de::DeserializeOwned;

use haccp_core::{GenerateError, GeneratedResult};

/// Parse the report payload out of raw LLM output.
pub fn parse_generated(raw: &str) -> Result<GeneratedResult, GenerateError> {
    let json_str = extract_json_object(raw)
        .ok_or_else(|| GenerateError::Malformed("no JSON object in response".to_string()))?;
    serde_json::from_str(json_str).map_err(|e| GenerateError::Malformed(e.to_string()))
}

/// Parse a suggestion list. Accepts `{"<key>": [...]}` as well as a bare
/// array. Returns empty vec on total parse failure (graceful degradation).
pub fn parse_list<T: DeserializeOwned>(raw: &str, key: &str) -> Vec<T> {
    // A leading array of objects is not a wrapped payload.
    let bare_array = strip_code_fence(raw).starts_with('[');
    if let Some(obj) = extract_json_object(raw).filter(|_| !bare_array) {
        if let Ok(mut value) = serde_json::from_str::<serde_json::Value>(obj) {
            if let Some(items) = value.get_mut(key).map(serde_json::Value::take) {
                if let Ok(list) = serde_json::from_value(items.clone()) {
                    return list;
                }
                // Keep whatever items are well-formed
                if let serde_json::Value::Array(items) = items {
                    return items
                        .into_iter()
                        .filter_map(|v| serde_json::from_value(v).ok())
                        .collect();
                }
            }
        }
    }

    let json_str = match extract_json_array(raw) {
        Some(s) => s,
        None => return vec![],
    };

    // Try full array parse first
    match serde_json::from_str(json_str) {
        Ok(list) => list,
        Err(_) => parse_line_by_line(json_str),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Extract the outermost JSON object substring from raw LLM output.
fn extract_json_object(raw: &str) -> Option<&str> {
    let raw = strip_code_fence(raw);
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Extract the JSON array substring from raw LLM output.
fn extract_json_array(raw: &str) -> Option<&str> {
    let raw = strip_code_fence(raw);
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Try to parse individual objects from a malformed JSON array.
fn parse_line_by_line<T: DeserializeOwned>(json_str: &str) -> Vec<T> {
    let inner = json_str
        .trim()
        .strip_prefix('[')
        .unwrap_or(json_str)
        .strip_suffix(']')
        .unwrap_or(json_str);

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, ch) in inner.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        if let Ok(item) = serde_json::from_str::<T>(&inner[s..=i]) {
                            items.push(item);
                        }
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }

    items
}
