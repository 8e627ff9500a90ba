//! Tolerant JSON decoding of model output.
//!
//! Models asked for "JSON only" still wrap answers in Markdown fences or
//! add a sentence before the object. Decoding tries the raw text first, then
//! the outermost `{ ... }` span after fences are removed.

use serde::de::DeserializeOwned;

/// Strip a surrounding Markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// The outermost `{ ... }` span of `raw`, if any.
pub fn outer_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Decode `raw` as `T`, tolerating code fences and surrounding prose.
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    match serde_json::from_str(raw.trim()) {
        Ok(value) => Ok(value),
        Err(first) => {
            let unfenced = strip_code_fence(raw);
            if let Ok(value) = serde_json::from_str(unfenced) {
                return Ok(value);
            }
            match outer_object(unfenced) {
                Some(span) => serde_json::from_str(span),
                None => Err(first),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn plain_json_decodes() {
        let v: Value = decode_json(r#"{"ok":true}"#).unwrap();
        assert_eq!(v["ok"], true);
    }

    #[test]
    fn fenced_json_decodes() {
        let raw = "```json\n{\"ok\": false, \"errors\": []}\n```";
        let v: Value = decode_json(raw).unwrap();
        assert_eq!(v["ok"], false);
    }

    #[test]
    fn prose_around_object_is_ignored() {
        let raw = "Aquí está el resultado:\n{\"action\": \"FINALIZE\"}\nSaludos.";
        let v: Value = decode_json(raw).unwrap();
        assert_eq!(v["action"], "FINALIZE");
    }

    #[test]
    fn garbage_fails() {
        assert!(decode_json::<Value>("no hay json aquí").is_err());
        assert!(decode_json::<Value>("} al revés {").is_err());
    }

    #[test]
    fn strip_fence_without_info_string() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }
}
