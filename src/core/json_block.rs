use crate::utils::error::{Result, ValidatorError};
use serde_json::Value;

/// Returns the first balanced `{...}` block of `content` that parses as JSON.
///
/// Model replies sometimes wrap the object in prose or emit several blocks.
/// The scan tracks brace depth outside string literals, so braces inside
/// values do not cut a candidate short. A balanced candidate that fails to
/// parse makes the scan restart right after its opening brace.
pub fn extract_json_object(content: &str) -> Result<Value> {
    let mut tried: Vec<&str> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find('{') {
        let start = pos + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end = None;

        for (i, ch) in content[start..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            if in_string {
                match ch {
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match ch {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(start + i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        if let Some(end) = end {
            let candidate = &content[start..end];
            tried.push(candidate);
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Ok(value);
            }
        }

        // '{' is one byte, so start + 1 is a char boundary
        pos = start + 1;
    }

    match tried.last() {
        Some(last) => Err(ValidatorError::LlmResponseError {
            message: format!(
                "{} JSON block(s) found, but none is valid.\nLast candidate tried:\n{}",
                tried.len(),
                last
            ),
        }),
        None => Err(ValidatorError::LlmResponseError {
            message: format!("no JSON block found in the model response.\nContent received:\n{}", content),
        }),
    }
}
