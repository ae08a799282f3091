use crate::error::{ParseError, ParseResult};
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token types for the ECMAScript module subset
///
/// Comments are real tokens rather than skipped trivia: the parser attaches
/// them to the entry that follows so reprinted containers keep them.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f\u{FEFF}]+")]
pub enum Token<'src> {
    // Keywords
    #[token("import")]
    Import,

    #[token("export")]
    Export,

    #[token("default")]
    Default,

    #[token("const")]
    Const,

    #[token("let")]
    Let,

    #[token("var")]
    Var,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    // Identifiers (`from`, `as` and `undefined` are contextual)
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // String literals, quotes included
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    // Template literals, backticks included
    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice())]
    Template(&'src str),

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice())]
    Number(&'src str),

    #[regex(r"//[^\n]*", |lex| lex.slice(), allow_greedy = true)]
    LineComment(&'src str),

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| lex.slice())]
    BlockComment(&'src str),

    // Symbols
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("...")]
    Ellipsis,

    #[token("=")]
    Equals,

    #[token("*")]
    Star,

    #[token("-")]
    Minus,
}

impl Token<'_> {
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }

    /// Keyword text for tokens that may still be used as property names
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Token::Import => Some("import"),
            Token::Export => Some("export"),
            Token::Default => Some("default"),
            Token::Const => Some("const"),
            Token::Let => Some("let"),
            Token::Var => Some("var"),
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::Null => Some("null"),
            _ => None,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword() {
            return write!(f, "keyword '{}'", keyword);
        }
        match self {
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Template(s) => write!(f, "template {}", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LineComment(_) | Token::BlockComment(_) => write!(f, "comment"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Colon => write!(f, "':'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Ellipsis => write!(f, "'...'"),
            Token::Equals => write!(f, "'='"),
            Token::Star => write!(f, "'*'"),
            Token::Minus => write!(f, "'-'"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Tokenize a source string, failing on the first unrecognized character
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, Range<usize>)>> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(()) => Err(ParseError::lex_error(
                span.clone(),
                format!("unexpected character {:?}", &source[span]),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = kinds("export default defineConfig imports undefined");

        assert_eq!(tokens[0], Token::Export);
        assert_eq!(tokens[1], Token::Default);
        assert_eq!(tokens[2], Token::Ident("defineConfig"));
        assert_eq!(tokens[3], Token::Ident("imports"));
        assert_eq!(tokens[4], Token::Ident("undefined"));
    }

    #[test]
    fn test_strings_and_templates() {
        let tokens = kinds(r#""a \"b\"" 'c' `d ${e}`"#);

        assert_eq!(tokens[0], Token::String(r#""a \"b\"""#));
        assert_eq!(tokens[1], Token::String("'c'"));
        assert_eq!(tokens[2], Token::Template("`d ${e}`"));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("42 3.14 .5 1e3 0xff -1");

        assert_eq!(tokens[0], Token::Number("42"));
        assert_eq!(tokens[1], Token::Number("3.14"));
        assert_eq!(tokens[2], Token::Number(".5"));
        assert_eq!(tokens[3], Token::Number("1e3"));
        assert_eq!(tokens[4], Token::Number("0xff"));
        assert_eq!(tokens[5], Token::Minus);
        assert_eq!(tokens[6], Token::Number("1"));
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = kinds("// line\n/* block ** */ a");

        assert_eq!(tokens[0], Token::LineComment("// line"));
        assert_eq!(tokens[1], Token::BlockComment("/* block ** */"));
        assert_eq!(tokens[2], Token::Ident("a"));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("{ a: 1 }").unwrap();

        assert_eq!(tokens[1].1, 2..3);
        assert_eq!(tokens[3].1, 5..6);
    }

    #[test]
    fn test_unknown_character_is_lex_error() {
        let err = tokenize("a # b").unwrap_err();
        assert!(matches!(err, ParseError::LexError { .. }));
    }
}
