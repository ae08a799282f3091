use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

/// Parser for the ECMAScript module subset
///
/// Comment tokens are split off up front; `comments_before[i]` holds the
/// spans of the comments that precede the i-th significant token so
/// entries can carry them into the tree. A comment that starts on the line
/// an entry ends on belongs to that entry rather than to the next one.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    comments_before: Vec<Vec<Range<usize>>>,
    pos: usize,
    tree: Tree,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        let mut comments_before = Vec::new();
        let mut pending = Vec::new();

        for (token, span) in tokenize(source)? {
            if token.is_comment() {
                pending.push(span);
            } else {
                tokens.push((token, span));
                comments_before.push(std::mem::take(&mut pending));
            }
        }
        // Comments after the last token
        comments_before.push(pending);

        Ok(Self {
            source,
            tokens,
            comments_before,
            pos: 0,
            tree: Tree::new(source),
        })
    }

    /// Parse a complete module
    pub fn parse_module(mut self) -> ParseResult<Tree> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            let statement = match self.peek() {
                Some((Token::Import, _)) => self.parse_import()?,
                Some((Token::Export, _)) => self.parse_export()?,
                Some((Token::Const | Token::Let | Token::Var, _)) => {
                    let start = self.peek_span().start;
                    self.parse_declaration(start, false)?
                }
                _ => {
                    return Err(ParseError::invalid_syntax(
                        self.peek_span(),
                        format!(
                            "Expected 'import', 'export' or a variable declaration, found {}",
                            Self::format_token(self.peek())
                        ),
                    ));
                }
            };
            body.push(statement);
        }

        let root = self.tree.root();
        for statement in &body {
            self.tree.set_parent(*statement, Some(root));
        }
        let trailing = self.comment_texts(self.comments_before.last().map(Vec::as_slice));
        if let Some(node) = self.tree.get_mut(root) {
            node.kind = NodeKind::Program { body };
            node.span = Some(Span::new(0, self.source.len()));
            node.trailing_comments = trailing;
        }
        self.tree.hints.indent = detect_indent(self.source);

        Ok(self.tree)
    }

    /// Parse `import … from "…"` or `import "…"`
    fn parse_import(&mut self) -> ParseResult<NodeId> {
        let start = self.peek_span().start;
        self.expect(Token::Import)?;

        let mut specifiers = Vec::new();

        if !matches!(self.peek(), Some((Token::String(_), _))) {
            if let Some((Token::Ident(name), _)) = self.peek() {
                let local = name.to_string();
                self.advance();
                specifiers.push(ImportSpecifier {
                    imported: "default".to_string(),
                    local,
                });
                if !self.match_token(Token::Comma) {
                    self.expect_contextual("from")?;
                    return self.finish_import(start, specifiers);
                }
            }

            if self.match_token(Token::Star) {
                self.expect_contextual("as")?;
                let local = self.expect_ident()?;
                specifiers.push(ImportSpecifier {
                    imported: "*".to_string(),
                    local,
                });
            } else {
                self.expect(Token::LBrace)?;
                while !self.check(Token::RBrace) && !self.is_at_end() {
                    let imported = self.expect_property_name()?.0;
                    let local = if self.match_contextual("as") {
                        self.expect_ident()?
                    } else {
                        imported.clone()
                    };
                    specifiers.push(ImportSpecifier { imported, local });
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBrace)?;
            }

            self.expect_contextual("from")?;
        }

        self.finish_import(start, specifiers)
    }

    fn finish_import(&mut self, start: usize, specifiers: Vec<ImportSpecifier>) -> ParseResult<NodeId> {
        let source = self.expect_string()?;
        self.match_token(Token::Semicolon);
        let end = self.last_end();

        Ok(self.alloc(
            NodeKind::Import { source, specifiers },
            start..end,
            start,
        ))
    }

    /// Parse `export default <expr>` or `export const|let|var …`
    fn parse_export(&mut self) -> ParseResult<NodeId> {
        let start = self.peek_span().start;
        self.expect(Token::Export)?;

        if self.match_token(Token::Default) {
            let value = self.parse_expression()?;
            self.match_token(Token::Semicolon);
            let end = self.last_end();
            let id = self.alloc(NodeKind::ExportDefault { value }, start..end, start);
            self.tree.set_parent(value, Some(id));
            return Ok(id);
        }

        match self.peek() {
            Some((Token::Const | Token::Let | Token::Var, _)) => self.parse_declaration(start, true),
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "'default', 'const', 'let' or 'var'",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Parse `const|let|var <name> = <expr>`
    fn parse_declaration(&mut self, start: usize, exported: bool) -> ParseResult<NodeId> {
        let kind = match self.peek() {
            Some((Token::Const, _)) => DeclarationKind::Const,
            Some((Token::Let, _)) => DeclarationKind::Let,
            _ => DeclarationKind::Var,
        };
        self.advance();

        let name = self.expect_ident()?;
        self.expect(Token::Equals)?;
        let value = self.parse_expression()?;
        self.match_token(Token::Semicolon);
        let end = self.last_end();

        let id = self.alloc(
            NodeKind::Declaration {
                exported,
                kind,
                name,
                value,
            },
            start..end,
            start,
        );
        self.tree.set_parent(value, Some(id));
        Ok(id)
    }

    /// Parse a value expression
    fn parse_expression(&mut self) -> ParseResult<NodeId> {
        let start = self.peek_span().start;

        match self.peek().map(|(token, span)| (token.clone(), span.clone())) {
            Some((Token::LBrace, _)) => self.parse_object(),
            Some((Token::LBracket, _)) => self.parse_array(),
            Some((Token::String(raw), span)) => {
                self.advance();
                self.note_quote(raw);
                let value = unescape(&raw[1..raw.len() - 1])
                    .map_err(|message| ParseError::invalid_syntax(span.clone(), message))?;
                Ok(self.alloc(NodeKind::Literal(Literal::String(value)), span, start))
            }
            Some((Token::Template(raw), span)) => {
                self.advance();
                let raw = raw[1..raw.len() - 1].to_string();
                Ok(self.alloc(NodeKind::Template { raw }, span, start))
            }
            Some((Token::Number(raw), span)) => {
                self.advance();
                let value = parse_number(raw)
                    .ok_or_else(|| ParseError::invalid_syntax(span.clone(), "Invalid number literal"))?;
                Ok(self.alloc(NodeKind::Literal(Literal::Number(value)), span, start))
            }
            Some((Token::Minus, _)) => {
                self.advance();
                match self.peek().map(|(token, span)| (token.clone(), span.clone())) {
                    Some((Token::Number(raw), span)) => {
                        self.advance();
                        let value = parse_number(raw).ok_or_else(|| {
                            ParseError::invalid_syntax(span.clone(), "Invalid number literal")
                        })?;
                        Ok(self.alloc(
                            NodeKind::Literal(Literal::Number(-value)),
                            start..span.end,
                            start,
                        ))
                    }
                    _ => Err(ParseError::unexpected_token(
                        self.peek_span(),
                        "number",
                        Self::format_token(self.peek()),
                    )),
                }
            }
            Some((Token::True, span)) => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Literal::Boolean(true)), span, start))
            }
            Some((Token::False, span)) => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Literal::Boolean(false)), span, start))
            }
            Some((Token::Null, span)) => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Literal::Null), span, start))
            }
            Some((Token::Ident(_), _)) => self.parse_reference(),
            Some((Token::Ellipsis, span)) => Err(ParseError::invalid_syntax(
                span,
                "Spread elements are not supported",
            )),
            None => Err(ParseError::unexpected_eof(self.last_end(), "expression")),
            Some(_) => Err(ParseError::unexpected_token(
                self.peek_span(),
                "expression",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Parse an identifier, a dotted path, or a call on either
    fn parse_reference(&mut self) -> ParseResult<NodeId> {
        let start = self.peek_span().start;
        let mut name = self.expect_ident()?;

        while self.match_token(Token::Dot) {
            let (segment, _) = self.expect_property_name()?;
            name.push('.');
            name.push_str(&segment);
        }

        if self.check(Token::LParen) {
            return self.parse_call(name, start);
        }

        let end = self.last_end();
        let kind = if name == "undefined" {
            NodeKind::Literal(Literal::Undefined)
        } else {
            NodeKind::Identifier { name }
        };
        Ok(self.alloc(kind, start..end, start))
    }

    /// Parse the argument list of `callee(…)`
    fn parse_call(&mut self, callee: String, start: usize) -> ParseResult<NodeId> {
        self.expect(Token::LParen)?;

        let mut arguments = Vec::new();
        while !self.check(Token::RParen) && !self.is_at_end() {
            let argument = self.parse_expression()?;
            arguments.push(argument);
            let separated = self.match_token(Token::Comma);
            self.take_line_comments(argument);
            if !separated {
                break;
            }
        }

        let trailing = self.pending_comments();
        self.expect(Token::RParen)?;
        let end = self.last_end();

        let id = self.alloc(
            NodeKind::Call {
                callee,
                arguments: arguments.clone(),
            },
            start..end,
            start,
        );
        self.adopt(id, &arguments, trailing);
        Ok(id)
    }

    /// Parse `{ key: value, … }`
    fn parse_object(&mut self) -> ParseResult<NodeId> {
        let start = self.peek_span().start;
        self.expect(Token::LBrace)?;

        let mut properties = Vec::new();
        let mut trailing_comma = false;

        while !self.check(Token::RBrace) && !self.is_at_end() {
            trailing_comma = false;
            let key_start = self.peek_span().start;
            let (key, key_style) = self.expect_property_name()?;
            let key_span = key_start..self.last_end();

            let (value, shorthand) = if self.match_token(Token::Colon) {
                (self.parse_expression()?, false)
            } else if key_style == KeyStyle::Identifier
                && (self.check(Token::Comma) || self.check(Token::RBrace))
            {
                let name = key.clone();
                (
                    self.alloc(NodeKind::Identifier { name }, key_span.clone(), key_span.start),
                    true,
                )
            } else {
                return Err(ParseError::unexpected_token(
                    self.peek_span(),
                    "':'",
                    Self::format_token(self.peek()),
                ));
            };

            let end = self.last_end();
            let property = self.alloc(
                NodeKind::Property {
                    key,
                    key_style,
                    value,
                    shorthand,
                },
                key_start..end,
                key_start,
            );
            self.tree.set_parent(value, Some(property));
            properties.push(property);

            let separated = self.match_token(Token::Comma);
            self.take_line_comments(property);
            if !separated {
                break;
            }
            trailing_comma = true;
        }

        let trailing = self.pending_comments();
        self.expect(Token::RBrace)?;
        let end = self.last_end();
        self.note_trailing_comma(start..end, trailing_comma && !properties.is_empty());

        let id = self.alloc(
            NodeKind::Object {
                properties: properties.clone(),
            },
            start..end,
            start,
        );
        self.adopt(id, &properties, trailing);
        Ok(id)
    }

    /// Parse `[ a, , b ]`
    fn parse_array(&mut self) -> ParseResult<NodeId> {
        let start = self.peek_span().start;
        self.expect(Token::LBracket)?;

        let mut elements = Vec::new();
        let mut trailing_comma = false;

        while !self.check(Token::RBracket) && !self.is_at_end() {
            if self.check(Token::Comma) {
                // Elided element
                elements.push(self.tree.alloc(NodeKind::Hole, None));
                self.advance();
                trailing_comma = false;
                continue;
            }

            let element = self.parse_expression()?;
            elements.push(element);
            trailing_comma = false;
            let separated = self.match_token(Token::Comma);
            self.take_line_comments(element);
            if !separated {
                break;
            }
            trailing_comma = true;
        }

        let trailing = self.pending_comments();
        self.expect(Token::RBracket)?;
        let end = self.last_end();
        self.note_trailing_comma(start..end, trailing_comma);

        let id = self.alloc(
            NodeKind::Array {
                elements: elements.clone(),
            },
            start..end,
            start,
        );
        self.adopt(id, &elements, trailing);
        Ok(id)
    }

    // Tree helpers

    /// Allocate a node with a span; comments preceding the token at
    /// `comments_at` become its leading comments
    fn alloc(&mut self, kind: NodeKind, span: Range<usize>, comments_at: usize) -> NodeId {
        let leading = self.comments_for_offset(comments_at);
        let id = self.tree.alloc(kind, Some(span.into()));
        if let Some(node) = self.tree.get_mut(id) {
            node.leading_comments = leading;
        }
        id
    }

    fn adopt(&mut self, parent: NodeId, children: &[NodeId], trailing: Vec<String>) {
        for child in children {
            self.tree.set_parent(*child, Some(parent));
        }
        if let Some(node) = self.tree.get_mut(parent) {
            node.trailing_comments = trailing;
        }
    }

    fn comments_for_offset(&self, offset: usize) -> Vec<String> {
        let comments = self
            .tokens
            .binary_search_by_key(&offset, |(_, span)| span.start)
            .ok()
            .and_then(|index| self.comments_before.get(index))
            .map(Vec::as_slice);
        self.comment_texts(comments)
    }

    /// Comments preceding the next token
    fn pending_comments(&self) -> Vec<String> {
        self.comment_texts(self.comments_before.get(self.pos).map(Vec::as_slice))
    }

    /// Move the comments that start on the line of the last consumed token
    /// onto `entry`, so they no longer lead the next token
    fn take_line_comments(&mut self, entry: NodeId) {
        let mut line_end = self.last_end();
        let mut taken = Vec::new();
        if let Some(pending) = self.comments_before.get_mut(self.pos) {
            while let Some(span) = pending.first() {
                if self.source[line_end..span.start].contains('\n') {
                    break;
                }
                line_end = span.end;
                taken.push(pending.remove(0));
            }
        }
        if taken.is_empty() {
            return;
        }

        let comments = self.comment_texts(Some(taken.as_slice()));
        if let Some(node) = self.tree.get_mut(entry) {
            node.line_comments = comments;
        }
    }

    fn comment_texts(&self, spans: Option<&[Range<usize>]>) -> Vec<String> {
        spans
            .map(|spans| spans.iter().map(|span| self.source[span.clone()].to_string()).collect())
            .unwrap_or_default()
    }

    fn note_quote(&mut self, raw: &str) {
        if self.tree.hints.quote.is_none() {
            self.tree.hints.quote = raw.chars().next();
        }
    }

    fn note_trailing_comma(&mut self, span: Range<usize>, trailing_comma: bool) {
        if self.tree.hints.trailing_comma.is_none() && self.source[span].contains('\n') {
            self.tree.hints.trailing_comma = Some(trailing_comma);
        }
    }

    // Token helpers

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, Range<usize>)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(ParseError::unexpected_eof(self.last_end(), token.to_string()))
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span(),
                token.to_string(),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn match_contextual(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some((Token::Ident(s), _)) if *s == word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_contextual(&mut self, word: &str) -> ParseResult<()> {
        if self.match_contextual(word) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span(),
                format!("'{}'", word),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "identifier",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Accept anything usable as a property name: identifiers, keywords,
    /// string and numeric literals
    fn expect_property_name(&mut self) -> ParseResult<(String, KeyStyle)> {
        let found = self.peek().map(|(token, span)| (token.clone(), span.clone()));
        let result = match found {
            Some((Token::Ident(s), _)) => (s.to_string(), KeyStyle::Identifier),
            Some((Token::String(raw), span)) => {
                let key = unescape(&raw[1..raw.len() - 1])
                    .map_err(|message| ParseError::invalid_syntax(span, message))?;
                (key, KeyStyle::Quoted)
            }
            Some((Token::Number(raw), span)) => {
                let value = parse_number(raw)
                    .ok_or_else(|| ParseError::invalid_syntax(span, "Invalid number literal"))?;
                (format_number(value), KeyStyle::Numeric)
            }
            Some((token, _)) if token.keyword().is_some() => (
                token.keyword().unwrap_or_default().to_string(),
                KeyStyle::Identifier,
            ),
            _ => {
                return Err(ParseError::unexpected_token(
                    self.peek_span(),
                    "property name",
                    Self::format_token(self.peek()),
                ))
            }
        };
        self.advance();
        Ok(result)
    }

    fn expect_string(&mut self) -> ParseResult<String> {
        match self.peek().map(|(token, span)| (token.clone(), span.clone())) {
            Some((Token::String(raw), span)) => {
                self.advance();
                self.note_quote(raw);
                unescape(&raw[1..raw.len() - 1])
                    .map_err(|message| ParseError::invalid_syntax(span, message))
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "string literal",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// End offset of the last consumed token
    fn last_end(&self) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .filter(|_| self.pos > 0)
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    /// Get the span of the next token (the one we're about to consume)
    fn peek_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| {
                // If we're at EOF, use the end of the last token
                let end = self.tokens.last().map(|(_, span)| span.end).unwrap_or(0);
                end..end
            })
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&(Token, Range<usize>)>) -> String {
        match token {
            None => "end of file".to_string(),
            Some((token, _)) => token.to_string(),
        }
    }
}

/// Decode the escapes of a string literal body
pub fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                out.push(decode_code_point(&hex)?);
            }
            Some('u') => {
                let rest = chars.as_str();
                let hex = if let Some(braced) = rest.strip_prefix('{') {
                    let close = braced.find('}').ok_or("Unterminated unicode escape")?;
                    let hex = braced[..close].to_string();
                    chars = braced[close + 1..].chars();
                    hex
                } else {
                    let hex: String = chars.by_ref().take(4).collect();
                    hex
                };
                out.push(decode_code_point(&hex)?);
            }
            Some(other) => out.push(other),
            None => return Err("Trailing backslash in string literal".to_string()),
        }
    }

    Ok(out)
}

fn decode_code_point(hex: &str) -> Result<char, String> {
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("Invalid escape sequence '{}'", hex))
}

/// Numeric value of a number token
pub fn parse_number(raw: &str) -> Option<f64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    raw.parse::<f64>().ok()
}

/// Shortest decimal form of a finite number, integers without a fraction
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Leading whitespace of the first indented, non-blank line
fn detect_indent(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        let trimmed = line.trim_start_matches([' ', '\t']);
        let indent = &line[..line.len() - trimmed.len()];
        (!indent.is_empty() && !trimmed.is_empty()).then(|| indent.to_string())
    })
}

pub fn parse(source: &str) -> ParseResult<Tree> {
    Parser::new(source)?.parse_module()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_value(tree: &Tree, index: usize) -> NodeId {
        match tree.kind(tree.statements()[index]) {
            Some(NodeKind::ExportDefault { value }) => *value,
            Some(NodeKind::Declaration { value, .. }) => *value,
            other => panic!("Expected export, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_default_export_object() {
        let source = r#"export default { foo: "bar", list: [1, 2] }"#;
        let tree = parse(source).unwrap();

        assert_eq!(tree.statements().len(), 1);
        let value = export_value(&tree, 0);
        let Some(NodeKind::Object { properties }) = tree.kind(value) else {
            panic!("Expected object");
        };
        assert_eq!(properties.len(), 2);
        assert_eq!(tree.text(value), Some(r#"{ foo: "bar", list: [1, 2] }"#));
        assert_eq!(tree.parent(properties[0]), Some(value));
    }

    #[test]
    fn test_parse_named_exports_and_imports() {
        let source = r#"
import { defineConfig as define } from "vite";
import * as path from 'path'
import vue, { ref } from "vue";

export const a = 1;
export let b = 'two'
const c = null;
"#;
        let tree = parse(source).unwrap();
        assert_eq!(tree.statements().len(), 6);

        let Some(NodeKind::Import { source, specifiers }) = tree.kind(tree.statements()[0]) else {
            panic!("Expected import");
        };
        assert_eq!(source, "vite");
        assert_eq!(specifiers[0].imported, "defineConfig");
        assert_eq!(specifiers[0].local, "define");

        let Some(NodeKind::Import { specifiers, .. }) = tree.kind(tree.statements()[2]) else {
            panic!("Expected import");
        };
        assert_eq!(specifiers.len(), 2);
        assert_eq!(specifiers[0].imported, "default");

        let Some(NodeKind::Declaration { exported, name, .. }) = tree.kind(tree.statements()[5]) else {
            panic!("Expected declaration");
        };
        assert!(!exported);
        assert_eq!(name, "c");
    }

    #[test]
    fn test_parse_call_expression() {
        let source = "export default defineConfig({ modules: [] })";
        let tree = parse(source).unwrap();

        let Some(NodeKind::Call { callee, arguments }) = tree.kind(export_value(&tree, 0)) else {
            panic!("Expected call");
        };
        assert_eq!(callee, "defineConfig");
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn test_parse_array_holes() {
        let tree = parse("export default [1, , 3, ]").unwrap();

        let Some(NodeKind::Array { elements }) = tree.kind(export_value(&tree, 0)) else {
            panic!("Expected array");
        };
        assert_eq!(elements.len(), 3);
        assert!(matches!(tree.kind(elements[1]), Some(NodeKind::Hole)));
    }

    #[test]
    fn test_parse_literals() {
        let tree = parse(r#"export default [-1.5, 0x10, 'a\n', `t`, true, null, undefined, foo.bar]"#).unwrap();

        let Some(NodeKind::Array { elements }) = tree.kind(export_value(&tree, 0)) else {
            panic!("Expected array");
        };
        let kinds: Vec<_> = elements.iter().map(|id| tree.kind(*id).cloned()).collect();
        assert!(matches!(kinds[0], Some(NodeKind::Literal(Literal::Number(n))) if n == -1.5));
        assert!(matches!(kinds[1], Some(NodeKind::Literal(Literal::Number(n))) if n == 16.0));
        assert!(matches!(&kinds[2], Some(NodeKind::Literal(Literal::String(s))) if s == "a\n"));
        assert!(matches!(&kinds[3], Some(NodeKind::Template { raw }) if raw == "t"));
        assert!(matches!(kinds[4], Some(NodeKind::Literal(Literal::Boolean(true)))));
        assert!(matches!(kinds[5], Some(NodeKind::Literal(Literal::Null))));
        assert!(matches!(kinds[6], Some(NodeKind::Literal(Literal::Undefined))));
        assert!(matches!(&kinds[7], Some(NodeKind::Identifier { name }) if name == "foo.bar"));
    }

    #[test]
    fn test_comments_attach_to_following_entry() {
        let source = "export default {\n  // first\n  a: 1,\n  /* last */\n}";
        let tree = parse(source).unwrap();

        let value = export_value(&tree, 0);
        let Some(NodeKind::Object { properties }) = tree.kind(value) else {
            panic!("Expected object");
        };
        let property = tree.get(properties[0]).unwrap();
        assert_eq!(property.leading_comments, vec!["// first".to_string()]);
        assert_eq!(
            tree.get(value).unwrap().trailing_comments,
            vec!["/* last */".to_string()]
        );
    }

    #[test]
    fn test_same_line_comments_stay_with_their_entry() {
        let source = "export default {\n  a: 1, // about a\n  // about b\n  b: [x, /* x */\n    y], /* b */ // end\n  c: 3 // last\n}";
        let tree = parse(source).unwrap();

        let value = export_value(&tree, 0);
        let Some(NodeKind::Object { properties }) = tree.kind(value) else {
            panic!("Expected object");
        };
        let a = tree.get(properties[0]).unwrap();
        let b = tree.get(properties[1]).unwrap();
        let c = tree.get(properties[2]).unwrap();
        assert_eq!(a.line_comments, vec!["// about a".to_string()]);
        assert_eq!(b.leading_comments, vec!["// about b".to_string()]);
        assert_eq!(
            b.line_comments,
            vec!["/* b */".to_string(), "// end".to_string()]
        );
        assert_eq!(c.line_comments, vec!["// last".to_string()]);
        assert!(tree.get(value).unwrap().trailing_comments.is_empty());

        let Some(NodeKind::Property { value: list, .. }) = tree.kind(properties[1]) else {
            panic!("Expected property");
        };
        let Some(NodeKind::Array { elements }) = tree.kind(*list) else {
            panic!("Expected array");
        };
        assert_eq!(tree.get(elements[0]).unwrap().line_comments, vec!["/* x */".to_string()]);
        assert!(tree.get(elements[1]).unwrap().leading_comments.is_empty());
    }

    #[test]
    fn test_shorthand_and_quoted_keys() {
        let tree = parse(r#"export default { foo, "bar-baz": 1, 2: true, default: 3 }"#).unwrap();

        let Some(NodeKind::Object { properties }) = tree.kind(export_value(&tree, 0)) else {
            panic!("Expected object");
        };
        let keys: Vec<_> = properties
            .iter()
            .filter_map(|id| match tree.kind(*id) {
                Some(NodeKind::Property { key, shorthand, .. }) => Some((key.clone(), *shorthand)),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("foo".to_string(), true),
                ("bar-baz".to_string(), false),
                ("2".to_string(), false),
                ("default".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_source_hints() {
        let source = "export default {\n    a: 'x',\n}\n";
        let tree = parse(source).unwrap();

        assert_eq!(tree.hints.quote, Some('\''));
        assert_eq!(tree.hints.indent.as_deref(), Some("    "));
        assert_eq!(tree.hints.trailing_comma, Some(true));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("export default { a: }"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse("export default [1, 2"),
            Err(ParseError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            parse("function f() {}"),
            Err(ParseError::InvalidSyntax { .. })
        ));
        assert!(matches!(
            parse("export default [...a]"),
            Err(ParseError::InvalidSyntax { .. })
        ));
    }
}
