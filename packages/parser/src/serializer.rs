use crate::ast::*;
use crate::error::{PrintError, PrintResult};
use crate::parser::format_number;
use crate::tokenizer::{tokenize, Token};
use serde::{Deserialize, Serialize};

/// Quote character used for freshly printed strings and keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

/// Layout settings for regenerated nodes
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOptions {
    pub quote: QuoteStyle,
    pub indent: String,
    pub trailing_comma: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            quote: QuoteStyle::Double,
            indent: "  ".to_string(),
            trailing_comma: false,
        }
    }
}

/// Supplies the text of a child while its parent is being printed
///
/// `indent` is the indentation of the line the child starts on, and
/// `inline` is set while the enclosing container is laid out on one line.
/// The stitcher answers with original text for clean children; [`print`]
/// answers by printing every child.
pub trait ChildText {
    fn child_text(
        &mut self,
        tree: &Tree,
        child: NodeId,
        indent: &str,
        inline: bool,
    ) -> PrintResult<String>;
}

/// Serializer prints one node from its structure
///
/// Only the node's own shape is generated here: brackets, separators,
/// keys and layout. Everything below it comes from a [`ChildText`], so a
/// reprinted container can still reuse the original text of untouched
/// entries.
pub struct Serializer<'a> {
    options: &'a PrintOptions,
}

impl<'a> Serializer<'a> {
    pub fn new(options: &'a PrintOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrintOptions {
        self.options
    }

    /// Print `id` whose first line is indented by `indent`; fresh
    /// containers stay on one line when `inline` is set
    pub fn print_node(
        &self,
        tree: &Tree,
        id: NodeId,
        indent: &str,
        inline: bool,
        children: &mut dyn ChildText,
    ) -> PrintResult<String> {
        let node = tree.get(id).ok_or(PrintError::MissingNode(id))?;

        match &node.kind {
            NodeKind::Program { body } => {
                let mut output = String::new();
                for statement in body {
                    output.push_str(&children.child_text(tree, *statement, "", false)?);
                    output.push('\n');
                }
                Ok(output)
            }
            NodeKind::Import { source, specifiers } => Ok(self.print_import(source, specifiers)),
            NodeKind::ExportDefault { value } => {
                let value = children.child_text(tree, *value, indent, inline)?;
                Ok(format!("export default {}{}", value, self.semicolon(tree, id)))
            }
            NodeKind::Declaration {
                exported,
                kind,
                name,
                value,
            } => {
                let value = children.child_text(tree, *value, indent, inline)?;
                Ok(format!(
                    "{}{} {} = {}{}",
                    if *exported { "export " } else { "" },
                    kind.as_str(),
                    name,
                    value,
                    self.semicolon(tree, id)
                ))
            }
            NodeKind::Object { .. } | NodeKind::Array { .. } => {
                self.print_container(tree, id, indent, inline, children)
            }
            NodeKind::Property {
                key,
                key_style,
                value,
                shorthand,
            } => {
                if *shorthand {
                    if let Some(NodeKind::Identifier { name }) = tree.kind(*value) {
                        if name == key {
                            return Ok(key.clone());
                        }
                    }
                }
                let value = children.child_text(tree, *value, indent, inline)?;
                Ok(format!("{}: {}", self.print_key(key, key_style), value))
            }
            NodeKind::Call { callee, arguments } => {
                let mut output = format!("{}(", callee);
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        output.push_str(", ");
                    }
                    output.push_str(&children.child_text(tree, *argument, indent, inline)?);
                }
                output.push(')');
                Ok(output)
            }
            NodeKind::Hole => Ok(String::new()),
            NodeKind::Literal(literal) => Ok(self.print_literal(literal)),
            NodeKind::Template { raw } => Ok(format!("`{}`", raw)),
            NodeKind::Identifier { name } => Ok(name.clone()),
            NodeKind::Reference { .. } => Err(PrintError::Unprintable {
                node: id,
                kind: node.kind.name(),
            }),
        }
    }

    /// Print `{…}` or `[…]`
    ///
    /// Containers that were single-line in the source stay inline unless an
    /// entry needs several lines or carries comments, and so do the fresh
    /// containers inside them. Otherwise fresh objects are multi-line and
    /// fresh arrays inline.
    fn print_container(
        &self,
        tree: &Tree,
        id: NodeId,
        indent: &str,
        inline: bool,
        children: &mut dyn ChildText,
    ) -> PrintResult<String> {
        let node = tree.get(id).ok_or(PrintError::MissingNode(id))?;
        let (entries, open, close) = match &node.kind {
            NodeKind::Object { properties } => (properties.as_slice(), '{', '}'),
            NodeKind::Array { elements } => (elements.as_slice(), '[', ']'),
            _ => (&[][..], '[', ']'),
        };
        let original = tree.text(id);

        if entries.is_empty() && node.trailing_comments.is_empty() {
            return Ok(format!("{}{}", open, close));
        }

        let own_inline = match original {
            Some(text) => !text.contains('\n'),
            None => open == '[' || inline,
        };
        // `{}` in the source says nothing about how entries are laid out
        let entries_inline =
            own_inline && !original.is_some_and(|text| text[1..text.len() - 1].trim().is_empty());

        let inner_indent = format!("{}{}", indent, self.options.indent);
        let mut texts = Vec::with_capacity(entries.len());
        let mut has_comments = !node.trailing_comments.is_empty();
        for entry in entries {
            let entry_node = tree.get(*entry).ok_or(PrintError::MissingNode(*entry))?;
            has_comments |=
                !entry_node.leading_comments.is_empty() || !entry_node.line_comments.is_empty();
            texts.push(children.child_text(tree, *entry, &inner_indent, entries_inline)?);
        }
        let ends_with_hole = entries
            .last()
            .is_some_and(|last| matches!(tree.kind(*last), Some(NodeKind::Hole)));

        let multiline = !own_inline || has_comments || texts.iter().any(|text| text.contains('\n'));

        if !multiline {
            let mut output = String::new();
            output.push(open);
            if open == '{' {
                output.push(' ');
            }
            output.push_str(&texts.join(", "));
            if ends_with_hole {
                output.push(',');
            }
            if open == '{' {
                output.push(' ');
            }
            output.push(close);
            return Ok(output);
        }

        let trailing_comma = match original {
            Some(text) if text.contains('\n') => ends_with_comma(text),
            _ => self.options.trailing_comma,
        };

        let mut output = String::new();
        output.push(open);
        output.push('\n');
        for (i, (entry, text)) in entries.iter().zip(&texts).enumerate() {
            let entry_node = tree.get(*entry).ok_or(PrintError::MissingNode(*entry))?;
            for comment in &entry_node.leading_comments {
                output.push_str(&inner_indent);
                output.push_str(comment);
                output.push('\n');
            }
            output.push_str(&inner_indent);
            output.push_str(text);
            if i + 1 < texts.len() || trailing_comma || ends_with_hole {
                output.push(',');
            }
            for comment in &entry_node.line_comments {
                output.push(' ');
                output.push_str(comment);
            }
            output.push('\n');
        }
        for comment in &node.trailing_comments {
            output.push_str(&inner_indent);
            output.push_str(comment);
            output.push('\n');
        }
        output.push_str(indent);
        output.push(close);
        Ok(output)
    }

    fn print_import(&self, source: &str, specifiers: &[ImportSpecifier]) -> String {
        let source = self.quote(source);
        if specifiers.is_empty() {
            return format!("import {};", source);
        }

        let mut clauses = Vec::new();
        let mut named = Vec::new();
        for specifier in specifiers {
            match specifier.imported.as_str() {
                "default" if named.is_empty() && clauses.is_empty() => {
                    clauses.push(specifier.local.clone())
                }
                "*" => clauses.push(format!("* as {}", specifier.local)),
                imported if imported == specifier.local => named.push(imported.to_string()),
                imported => named.push(format!("{} as {}", imported, specifier.local)),
            }
        }
        if !named.is_empty() {
            clauses.push(format!("{{ {} }}", named.join(", ")));
        }
        format!("import {} from {};", clauses.join(", "), source)
    }

    fn print_key(&self, key: &str, style: &KeyStyle) -> String {
        match style {
            KeyStyle::Identifier if is_identifier(key) => key.to_string(),
            KeyStyle::Numeric => key.to_string(),
            _ => self.quote(key),
        }
    }

    pub fn print_literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(value) => self.quote(value),
            Literal::Number(value) => format_number(*value),
            Literal::Boolean(value) => value.to_string(),
            Literal::Null => "null".to_string(),
            Literal::Undefined => "undefined".to_string(),
        }
    }

    /// Quote and escape a string with the configured quote character
    pub fn quote(&self, value: &str) -> String {
        let quote = self.options.quote.as_char();
        let mut output = String::with_capacity(value.len() + 2);
        output.push(quote);
        for c in value.chars() {
            match c {
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c == quote => {
                    output.push('\\');
                    output.push(c);
                }
                c if c.is_control() => output.push_str(&format!("\\u{:04x}", c as u32)),
                c => output.push(c),
            }
        }
        output.push(quote);
        output
    }

    fn semicolon(&self, tree: &Tree, id: NodeId) -> &'static str {
        match tree.text(id) {
            Some(text) if !text.trim_end().ends_with(';') => "",
            _ => ";",
        }
    }
}

/// Whether `name` can be written as a bare property key
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether the last entry of the container `text` is followed by a comma
fn ends_with_comma(text: &str) -> bool {
    tokenize(text)
        .map(|tokens| {
            tokens
                .iter()
                .rev()
                .filter(|(token, _)| !token.is_comment())
                .nth(1)
                .is_some_and(|(token, _)| matches!(token, Token::Comma))
        })
        .unwrap_or(false)
}

/// Prints every descendant from structure, following references
struct FullPrinter<'a> {
    serializer: Serializer<'a>,
}

impl ChildText for FullPrinter<'_> {
    fn child_text(
        &mut self,
        tree: &Tree,
        child: NodeId,
        indent: &str,
        inline: bool,
    ) -> PrintResult<String> {
        match tree.kind(child) {
            Some(NodeKind::Reference { tree: None, target }) => {
                let target = *target;
                self.child_text(tree, target, indent, inline)
            }
            Some(NodeKind::Reference {
                tree: Some(other),
                target,
            }) => {
                let other = other.borrow();
                self.child_text(&other, *target, indent, inline)
            }
            _ => {
                let serializer = Serializer::new(self.serializer.options);
                serializer.print_node(tree, child, indent, inline, self)
            }
        }
    }
}

/// Print a node and everything below it from structure alone
pub fn print(tree: &Tree, id: NodeId, options: &PrintOptions) -> PrintResult<String> {
    let mut printer = FullPrinter {
        serializer: Serializer::new(options),
    };
    printer.child_text(tree, id, "", false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn alloc_string(tree: &mut Tree, value: &str) -> NodeId {
        tree.alloc(NodeKind::Literal(Literal::String(value.to_string())), None)
    }

    fn fresh_object(tree: &mut Tree, entries: Vec<(&str, NodeId)>) -> NodeId {
        let mut properties = Vec::new();
        for (key, value) in entries {
            properties.push(tree.alloc(
                NodeKind::Property {
                    key: key.to_string(),
                    key_style: if is_identifier(key) {
                        KeyStyle::Identifier
                    } else {
                        KeyStyle::Quoted
                    },
                    value,
                    shorthand: false,
                },
                None,
            ));
        }
        tree.alloc(NodeKind::Object { properties }, None)
    }

    #[test]
    fn test_print_fresh_object_is_multiline() {
        let mut tree = Tree::new("");
        let value = alloc_string(&mut tree, "bar");
        let object = fresh_object(&mut tree, vec![("foo", value), ("a-b", value)]);

        let output = print(&tree, object, &PrintOptions::default()).unwrap();
        assert_eq!(output, "{\n  foo: \"bar\",\n  \"a-b\": \"bar\"\n}");
    }

    #[test]
    fn test_print_fresh_array_is_inline() {
        let mut tree = Tree::new("");
        let a = tree.alloc(NodeKind::Literal(Literal::Number(1.0)), None);
        let hole = tree.alloc(NodeKind::Hole, None);
        let array = tree.alloc(
            NodeKind::Array {
                elements: vec![a, hole],
            },
            None,
        );

        let output = print(&tree, array, &PrintOptions::default()).unwrap();
        assert_eq!(output, "[1, ,]");
    }

    #[test]
    fn test_print_single_quotes_and_escapes() {
        let options = PrintOptions {
            quote: QuoteStyle::Single,
            ..PrintOptions::default()
        };
        let serializer = Serializer::new(&options);

        assert_eq!(serializer.quote("it's\n"), "'it\\'s\\n'");
        assert_eq!(serializer.print_literal(&Literal::Number(-2.5)), "-2.5");
        assert_eq!(serializer.print_literal(&Literal::Number(3.0)), "3");
    }

    #[test]
    fn test_print_parsed_module_from_structure() {
        let source = "import a, { b as c } from 'x'\nexport default defineConfig({ list: [1, 'two'] })";
        let tree = parse(source).unwrap();

        let output = print(&tree, tree.root(), &PrintOptions::default()).unwrap();
        assert_eq!(
            output,
            "import a, { b as c } from \"x\";\nexport default defineConfig({ list: [1, \"two\"] })\n"
        );
    }

    #[test]
    fn test_trailing_comma_detection_skips_comments() {
        assert!(ends_with_comma("{\n  a: 1,\n  // tail\n}"));
        assert!(ends_with_comma("[\n  1, /* one */\n]"));
        assert!(!ends_with_comma("{\n  b: 2 // b, c\n}"));
        assert!(!ends_with_comma("[\n  'a,'\n]"));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("$el_2"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
