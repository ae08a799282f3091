use crate::tracker::ChangeTracker;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

/// Byte range of a node in the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Stable handle of a node inside its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tree shared between a module and every view bound into it
pub type SharedTree = Rc<RefCell<Tree>>;

/// `const`, `let` or `var`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Const,
    Let,
    Var,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Const => "const",
            DeclarationKind::Let => "let",
            DeclarationKind::Var => "var",
        }
    }
}

/// One binding introduced by an import declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// Name exported by the source module; `default` or `*` for
    /// default and namespace imports
    pub imported: String,
    /// Local binding name
    pub local: String,
}

/// How a property key was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyStyle {
    Identifier,
    Quoted,
    Numeric,
}

/// Primitive literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

/// Node kinds of the module subset
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Root of a module: ordered top-level statements
    Program { body: Vec<NodeId> },

    /// `import … from "source"`; printed from its original text only
    Import {
        source: String,
        specifiers: Vec<ImportSpecifier>,
    },

    /// `export default <value>`
    ExportDefault { value: NodeId },

    /// `[export] const|let|var <name> = <value>`
    Declaration {
        exported: bool,
        kind: DeclarationKind,
        name: String,
        value: NodeId,
    },

    /// `{ … }` with Property children in source order
    Object { properties: Vec<NodeId> },

    /// `key: value` or shorthand `key`
    Property {
        key: String,
        key_style: KeyStyle,
        value: NodeId,
        shorthand: bool,
    },

    /// `[ … ]`; elided slots are Hole nodes
    Array { elements: Vec<NodeId> },

    /// An empty array slot
    Hole,

    Literal(Literal),

    /// Template literal; `raw` excludes the backticks
    Template { raw: String },

    /// Identifier reference or dotted member path (`a.b.c`)
    Identifier { name: String },

    /// `callee(arg, …)`
    Call { callee: String, arguments: Vec<NodeId> },

    /// A node reachable from a second place. `tree` is `None` when the
    /// target lives in the same tree.
    Reference {
        tree: Option<SharedTree>,
        target: NodeId,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "program",
            NodeKind::Import { .. } => "import",
            NodeKind::ExportDefault { .. } => "export-default",
            NodeKind::Declaration { .. } => "declaration",
            NodeKind::Object { .. } => "object",
            NodeKind::Property { .. } => "property",
            NodeKind::Array { .. } => "array",
            NodeKind::Hole => "hole",
            NodeKind::Literal(_) => "literal",
            NodeKind::Template { .. } => "template",
            NodeKind::Identifier { .. } => "identifier",
            NodeKind::Call { .. } => "function-call",
            NodeKind::Reference { .. } => "reference",
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { body } => body.clone(),
            NodeKind::ExportDefault { value }
            | NodeKind::Declaration { value, .. }
            | NodeKind::Property { value, .. } => vec![*value],
            NodeKind::Object { properties } => properties.clone(),
            NodeKind::Array { elements } => elements.clone(),
            NodeKind::Call { arguments, .. } => arguments.clone(),
            NodeKind::Import { .. }
            | NodeKind::Hole
            | NodeKind::Literal(_)
            | NodeKind::Template { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::Reference { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` for nodes created after parsing
    pub span: Option<Span>,
    pub parent: Option<NodeId>,
    /// Comments directly preceding this node inside its container
    pub leading_comments: Vec<String>,
    /// Comments between the last entry of a container and its closing bracket
    pub trailing_comments: Vec<String>,
    /// Comments on the same line as this entry, after its separator
    pub line_comments: Vec<String>,
}

/// Formatting conventions observed while parsing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceHints {
    /// Quote character of the first string literal
    pub quote: Option<char>,
    /// Leading whitespace of the first indented line
    pub indent: Option<String>,
    /// Whether the first multi-line container ended with a comma
    pub trailing_comma: Option<bool>,
}

/// Arena of nodes for one parsed module
#[derive(Debug, Clone)]
pub struct Tree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
    pub hints: SourceHints,
    changes: ChangeTracker,
}

impl Tree {
    /// Create an empty tree over `source` whose root is an empty program
    pub fn new(source: impl Into<String>) -> Self {
        let mut tree = Self {
            source: source.into(),
            nodes: Vec::new(),
            root: NodeId(0),
            hints: SourceHints::default(),
            changes: ChangeTracker::new(),
        };
        tree.root = tree.alloc(NodeKind::Program { body: Vec::new() }, None);
        tree
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node without a parent
    pub fn alloc(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize, "node arena is full");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            leading_comments: Vec::new(),
            trailing_comments: Vec::new(),
            line_comments: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.get_mut(id).map(|node| &mut node.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
    }

    /// Original source text of a node, if it has any
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let span = self.get(id)?.span?;
        self.source.get(span.range())
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Record that the shape of `id` changed
    pub fn mark_dirty(&mut self, id: NodeId) -> bool {
        self.changes.mark(id)
    }

    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Top-level statements of the program
    pub fn statements(&self) -> &[NodeId] {
        match self.kind(self.root) {
            Some(NodeKind::Program { body }) => body,
            _ => &[],
        }
    }
}
