//! Canonical JSON emission for machine-readable CLI output

use anyhow::{Context, Result};
use serde::Serialize;

/// Emit a value as JCS-canonical JSON (RFC 8785).
///
/// Every `--json` surface (views, topic listings, doctor and config
/// reports) goes through this function so output is byte-stable regardless
/// of struct field order.
///
/// # Example
///
/// ```rust
/// use archpro_utils::canonicalization::emit_jcs;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Tab {
///     phase: &'static str,
///     cached: bool,
/// }
///
/// let json = emit_jcs(&Tab { phase: "requirements", cached: true }).unwrap();
/// assert_eq!(json, r#"{"cached":true,"phase":"requirements"}"#);
/// ```
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_jcs_sorts_keys() {
        let value = json!({ "zeta": 1, "alpha": { "b": 2, "a": 1 } });
        let out = emit_jcs(&value).unwrap();
        assert_eq!(out, r#"{"alpha":{"a":1,"b":2},"zeta":1}"#);
    }

    #[test]
    fn test_emit_jcs_preserves_unicode_content() {
        let value = json!({ "icon": "🚗", "name": "Uber / Ride Sharing" });
        let out = emit_jcs(&value).unwrap();
        assert!(out.contains("🚗"));
        assert!(out.contains("Uber / Ride Sharing"));
    }
}
