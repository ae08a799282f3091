//! Error types for the module parser and printer

use crate::ast::{NodeId, Span};
use std::ops::Range;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location and context
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {span}: expected {expected}, found {found}")]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at {pos}: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Invalid syntax at {span}: {message}")]
    InvalidSyntax { span: Span, message: String },

    #[error("Lexer error at {span}: {message}")]
    LexError { span: Span, message: String },
}

impl ParseError {
    pub fn unexpected_token(
        span: Range<usize>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span: span.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span: span.into(),
            message: message.into(),
        }
    }

    pub fn lex_error(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::LexError {
            span: span.into(),
            message: message.into(),
        }
    }

    /// Byte range the error points at
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::LexError { span, .. } => *span,
            ParseError::UnexpectedEof { pos, .. } => Span::new(*pos, *pos),
        }
    }

    fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnexpectedEof { expected, .. } => format!("expected {}", expected),
            ParseError::InvalidSyntax { message, .. } | ParseError::LexError { message, .. } => {
                message.clone()
            }
        }
    }
}

/// Result type for printing operations
pub type PrintResult<T> = Result<T, PrintError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrintError {
    #[error("Node {0} does not exist in this tree")]
    MissingNode(NodeId),

    #[error("Node {node} of kind {kind} cannot be printed in this position")]
    Unprintable { node: NodeId, kind: &'static str },
}

/// Pretty-print a parse error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, filename: &str, errors: &[ParseError]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for error in errors {
        let span = error.span();
        let end = span.end.max(span.start + 1).min(source.len().max(1));
        let start = span.start.min(end.saturating_sub(1));

        let report = Report::build(ReportKind::Error, filename, start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, start..end))
                    .with_color(Color::Red)
                    .with_message(error.label()),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            return error.to_string();
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

/// Plain-text fallback when ariadne is not compiled in
#[cfg(not(feature = "pretty-errors"))]
pub fn format_errors(_source: &str, filename: &str, errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {} ({})\n", filename, error, error.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_of_eof_is_empty() {
        let err = ParseError::unexpected_eof(12, "'}'");
        assert_eq!(err.span(), Span::new(12, 12));
    }

    #[test]
    fn test_format_errors_mentions_file_and_message() {
        let source = "export default { a: }";
        let err = ParseError::unexpected_token(20..21, "expression", "'}'");
        let rendered = format_errors(source, "config.ts", &[err]);

        assert!(rendered.contains("config.ts"));
        assert!(rendered.contains("expected expression"));
    }
}
