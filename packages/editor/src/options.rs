use crate::errors::EditResult;
use castwork_parser::ast::SourceHints;
use castwork_parser::{PrintOptions, QuoteStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Formatting of freshly printed nodes
///
/// Unset fields are detected from the original source, then fall back to
/// double quotes, two-space indentation and no trailing comma.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteStyle>,

    /// One indentation unit, e.g. `"  "` or `"\t"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<String>,

    /// Trailing comma after the last entry of fresh multi-line containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_comma: Option<bool>,
}

impl GenerateOptions {
    pub fn from_json(json: &str) -> EditResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> EditResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Fill unset fields from what the parser observed
    pub fn resolve(&self, hints: &SourceHints) -> PrintOptions {
        let defaults = PrintOptions::default();
        let detected_quote = match hints.quote {
            Some('\'') => Some(QuoteStyle::Single),
            Some('"') => Some(QuoteStyle::Double),
            _ => None,
        };

        PrintOptions {
            quote: self.quote.or(detected_quote).unwrap_or(defaults.quote),
            indent: self
                .indent
                .clone()
                .or_else(|| hints.indent.clone())
                .unwrap_or(defaults.indent),
            trailing_comma: self
                .trailing_comma
                .or(hints.trailing_comma)
                .unwrap_or(defaults.trailing_comma),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let options = GenerateOptions::from_json(r#"{ "quote": "single", "trailingComma": true }"#).unwrap();

        assert_eq!(options.quote, Some(QuoteStyle::Single));
        assert_eq!(options.indent, None);
        assert_eq!(options.trailing_comma, Some(true));
    }

    #[test]
    fn test_invalid_options_are_errors() {
        assert!(GenerateOptions::from_json(r#"{ "quote": "backtick" }"#).is_err());
    }

    #[test]
    fn test_resolve_prefers_explicit_then_detected() {
        let hints = SourceHints {
            quote: Some('\''),
            indent: Some("\t".to_string()),
            trailing_comma: None,
        };

        let resolved = GenerateOptions::default().resolve(&hints);
        assert_eq!(resolved.quote, QuoteStyle::Single);
        assert_eq!(resolved.indent, "\t");
        assert!(!resolved.trailing_comma);

        let explicit = GenerateOptions {
            quote: Some(QuoteStyle::Double),
            indent: Some("    ".to_string()),
            trailing_comma: Some(true),
        };
        let resolved = explicit.resolve(&hints);
        assert_eq!(resolved.quote, QuoteStyle::Double);
        assert_eq!(resolved.indent, "    ");
        assert!(resolved.trailing_comma);
    }
}
