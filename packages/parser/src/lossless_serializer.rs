use crate::ast::*;
use crate::error::{PrintError, PrintResult};
use crate::serializer::{ChildText, PrintOptions, Serializer};
use std::collections::{HashMap, HashSet};

/// Lossless serializer that preserves original formatting using spans
///
/// This serializer enables minimal-diff editing:
/// 1. Parse source → tree with spans
/// 2. Edit the tree, marking each reshaped node dirty
/// 3. Serialize → original text everywhere nothing changed
///
/// Strategy:
/// - Nodes with no dirty descendant: copy original source verbatim
/// - Dirty or freshly created nodes: print the node's own shape, asking
///   back here for each child
/// - Clean nodes above a dirty one: original text with the affected
///   children's spans replaced
pub struct LosslessSerializer<'a> {
    options: &'a PrintOptions,
}

impl<'a> LosslessSerializer<'a> {
    pub fn new(options: &'a PrintOptions) -> Self {
        Self { options }
    }

    /// Serialize a whole module
    pub fn serialize(&self, tree: &Tree) -> PrintResult<String> {
        let mut stitch = Stitch::new(self.options, tree);
        stitch.child_text(tree, tree.root(), "", false)
    }
}

/// Stitching state for one tree
struct Stitch<'a> {
    options: &'a PrintOptions,
    /// Dirty nodes and their ancestors
    affected: HashSet<NodeId>,
}

impl<'a> Stitch<'a> {
    fn new(options: &'a PrintOptions, tree: &Tree) -> Self {
        Self {
            options,
            affected: tree.changes().affected(|id| tree.parent(id)),
        }
    }

    /// Original text with the spans of affected children re-stitched
    fn splice(&mut self, tree: &Tree, id: NodeId, span: Span, inline: bool) -> PrintResult<String> {
        let source = tree.source();
        let kind = tree.kind(id).ok_or(PrintError::MissingNode(id))?;
        let inline = match kind {
            NodeKind::Object { .. } | NodeKind::Array { .. } | NodeKind::Call { .. } => {
                !source[span.range()].contains('\n')
            }
            _ => inline,
        };

        let mut output = String::with_capacity(span.end - span.start);
        let mut cursor = span.start;
        for child in kind.children() {
            if !self.affected.contains(&child) {
                continue;
            }
            let Some(child_span) = tree.get(child).and_then(|node| node.span) else {
                continue;
            };
            output.push_str(&source[cursor..child_span.start]);
            let indent = line_indent(source, child_span.start);
            output.push_str(&self.child_text(tree, child, &indent, inline)?);
            cursor = child_span.end;
        }
        output.push_str(&source[cursor..span.end]);
        Ok(output)
    }

    /// Rebuild the statement list, keeping the original text between
    /// surviving statements and dropping that of removed ones
    ///
    /// A run of removed statements hands its leading gap to the next
    /// surviving statement, so a file header survives removal of the
    /// statement below it.
    fn program(&mut self, tree: &Tree, body: &[NodeId]) -> PrintResult<String> {
        let source = tree.source();
        let originals = original_statements(tree);

        if originals.is_empty() {
            let mut output = source.to_string();
            for statement in body {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&self.child_text(tree, *statement, "", false)?);
                output.push('\n');
            }
            return Ok(output);
        }

        // Leading gap each surviving statement is emitted with
        let mut gaps = HashMap::new();
        let mut removed_gap = None;
        let mut previous_end = 0;
        for (id, span) in &originals {
            let own_gap = previous_end..span.start;
            if body.contains(id) {
                gaps.insert(*id, removed_gap.take().unwrap_or(own_gap));
            } else {
                removed_gap.get_or_insert(own_gap);
            }
            previous_end = span.end;
        }

        let mut output = String::new();
        for statement in body {
            match tree.get(*statement).and_then(|node| node.span) {
                Some(_) => {
                    if let Some(gap) = gaps.get(statement) {
                        output.push_str(&source[gap.clone()]);
                    }
                    output.push_str(&self.child_text(tree, *statement, "", false)?);
                }
                None => {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                    output.push_str(&self.child_text(tree, *statement, "", false)?);
                }
            }
        }

        let tail = &source[previous_end..];
        if output.is_empty() {
            output.push_str(tail.trim_start());
        } else {
            output.push_str(tail);
        }
        Ok(output)
    }
}

impl ChildText for Stitch<'_> {
    fn child_text(
        &mut self,
        tree: &Tree,
        child: NodeId,
        indent: &str,
        inline: bool,
    ) -> PrintResult<String> {
        let node = tree.get(child).ok_or(PrintError::MissingNode(child))?;

        match &node.kind {
            NodeKind::Reference { tree: None, target } => {
                return self.child_text(tree, *target, indent, inline);
            }
            NodeKind::Reference {
                tree: Some(other),
                target,
            } => {
                let other = other.borrow();
                let mut nested = Stitch::new(self.options, &other);
                return nested.child_text(&other, *target, indent, inline);
            }
            _ => {}
        }

        let serializer = Serializer::new(self.options);
        let Some(span) = node.span else {
            return serializer.print_node(tree, child, indent, inline, self);
        };

        if !self.affected.contains(&child) {
            return Ok(tree.source()[span.range()].to_string());
        }

        if !tree.changes().is_dirty(child) {
            return self.splice(tree, child, span, inline);
        }

        if let NodeKind::Program { body } = &node.kind {
            return self.program(tree, body);
        }

        let indent = line_indent(tree.source(), span.start);
        serializer.print_node(tree, child, &indent, inline, self)
    }
}

/// Statements the source originally had, in source order
fn original_statements(tree: &Tree) -> Vec<(NodeId, Span)> {
    let mut statements: Vec<(NodeId, Span)> = (0..tree.len() as u32)
        .map(NodeId)
        .filter_map(|id| {
            let node = tree.get(id)?;
            match node.kind {
                NodeKind::Import { .. } | NodeKind::ExportDefault { .. } | NodeKind::Declaration { .. } => {
                    node.span.map(|span| (id, span))
                }
                _ => None,
            }
        })
        .collect();
    statements.sort_by_key(|(_, span)| span.start);
    statements
}

/// Leading whitespace of the line containing `offset`
pub fn line_indent(source: &str, offset: usize) -> String {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}
