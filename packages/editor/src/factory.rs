//! Materialization of inputs into tree nodes

use crate::errors::{EditResult, EditorError};
use crate::value::Input;
use castwork_parser::ast::{KeyStyle, Literal};
use castwork_parser::serializer::is_identifier;
use castwork_parser::{NodeId, NodeKind, SharedTree, Tree};
use std::cell::Ref;
use std::collections::HashSet;
use std::rc::Rc;

/// Builds detached nodes in `tree` for values about to be placed under
/// `container`
///
/// Views become reference nodes rather than copies, so edits through
/// either location land on the same node.
pub(crate) struct NodeFactory<'a> {
    tree: &'a mut Tree,
    dest: &'a SharedTree,
    container: NodeId,
}

impl<'a> NodeFactory<'a> {
    pub fn new(tree: &'a mut Tree, dest: &'a SharedTree, container: NodeId) -> Self {
        Self {
            tree,
            dest,
            container,
        }
    }

    /// Build the node for `input`; the caller links it into place
    pub fn build(&mut self, input: &Input) -> EditResult<NodeId> {
        match input {
            Input::Undefined => Ok(self.literal(Literal::Undefined)),
            Input::Number(value) => self.number(*value),
            Input::Identifier(name) => {
                if !name.split('.').all(is_identifier) {
                    return Err(EditorError::UnsupportedValueKind(format!(
                        "'{}' is not an identifier or member path",
                        name
                    )));
                }
                Ok(self.tree.alloc(NodeKind::Identifier { name: name.clone() }, None))
            }
            Input::Data(data) => self.data(data),
            Input::View(binding) => {
                let (tree, target) = binding.target().ok_or(EditorError::Detached)?;
                if self.reaches(&tree, target) {
                    return Err(EditorError::CyclicReference);
                }
                let tree = if Rc::ptr_eq(&tree, self.dest) {
                    None
                } else {
                    Some(tree)
                };
                Ok(self.tree.alloc(NodeKind::Reference { tree, target }, None))
            }
        }
    }

    fn data(&mut self, data: &serde_json::Value) -> EditResult<NodeId> {
        match data {
            serde_json::Value::Null => Ok(self.literal(Literal::Null)),
            serde_json::Value::Bool(value) => Ok(self.literal(Literal::Boolean(*value))),
            serde_json::Value::Number(number) => {
                let value = number.as_f64().ok_or_else(|| {
                    EditorError::UnsupportedValueKind(format!("number {} has no f64 form", number))
                })?;
                self.number(value)
            }
            serde_json::Value::String(value) => Ok(self.literal(Literal::String(value.clone()))),
            serde_json::Value::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(self.data(item)?);
                }
                let array = self.tree.alloc(NodeKind::Array { elements: elements.clone() }, None);
                for element in elements {
                    self.tree.set_parent(element, Some(array));
                }
                Ok(array)
            }
            serde_json::Value::Object(entries) => {
                let mut properties = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.data(value)?;
                    let property = self.tree.alloc(
                        NodeKind::Property {
                            key: key.clone(),
                            key_style: key_style(key),
                            value,
                            shorthand: false,
                        },
                        None,
                    );
                    self.tree.set_parent(value, Some(property));
                    properties.push(property);
                }
                let object = self
                    .tree
                    .alloc(NodeKind::Object { properties: properties.clone() }, None);
                for property in properties {
                    self.tree.set_parent(property, Some(object));
                }
                Ok(object)
            }
        }
    }

    fn number(&mut self, value: f64) -> EditResult<NodeId> {
        if !value.is_finite() {
            return Err(EditorError::UnsupportedValueKind(format!(
                "non-finite number {}",
                value
            )));
        }
        Ok(self.literal(Literal::Number(value)))
    }

    fn literal(&mut self, literal: Literal) -> NodeId {
        self.tree.alloc(NodeKind::Literal(literal), None)
    }

    /// Whether the container receiving the value lies inside `target`,
    /// following references across trees
    fn reaches(&self, tree: &SharedTree, target: NodeId) -> bool {
        let mut stack = vec![(tree.clone(), target)];
        let mut seen = HashSet::new();

        while let Some((current, id)) = stack.pop() {
            let in_dest = Rc::ptr_eq(&current, self.dest);
            if in_dest && id == self.container {
                return true;
            }
            if !seen.insert((Rc::as_ptr(&current) as usize, id)) {
                continue;
            }

            let guard: Ref<'_, Tree>;
            let view: &Tree = if in_dest {
                &*self.tree
            } else {
                guard = current.borrow();
                &guard
            };

            match view.kind(id) {
                Some(NodeKind::Reference { tree: other, target }) => {
                    let next = other.clone().unwrap_or_else(|| current.clone());
                    stack.push((next, *target));
                }
                Some(kind) => {
                    stack.extend(kind.children().into_iter().map(|child| (current.clone(), child)));
                }
                None => {}
            }
        }
        false
    }
}

/// Materialize pending views among `inputs` before any tree is borrowed
/// for writing
pub(crate) fn prepare<'i>(inputs: impl IntoIterator<Item = &'i Input>) -> EditResult<()> {
    for input in inputs {
        if let Input::View(binding) = input {
            binding.materialize()?;
        }
    }
    Ok(())
}

/// Key style for a freshly written property name
pub(crate) fn key_style(key: &str) -> KeyStyle {
    if is_identifier(key) {
        KeyStyle::Identifier
    } else if key.parse::<u64>().is_ok_and(|n| n.to_string() == key) {
        KeyStyle::Numeric
    } else {
        KeyStyle::Quoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castwork_parser::{print, PrintOptions};
    use serde_json::json;
    use std::cell::RefCell;

    fn empty() -> SharedTree {
        Rc::new(RefCell::new(Tree::new("")))
    }

    #[test]
    fn test_build_plain_data() {
        let dest = empty();
        let root = dest.borrow().root();
        let mut guard = dest.borrow_mut();
        let node = NodeFactory::new(&mut guard, &dest, root)
            .build(&Input::from(json!({ "foo": "bar", "list": [1, true, null], "a-b": 2 })))
            .unwrap();

        let text = print(&guard, node, &PrintOptions::default()).unwrap();
        assert_eq!(text, "{\n  foo: \"bar\",\n  list: [1, true, null],\n  \"a-b\": 2\n}");
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let dest = empty();
        let root = dest.borrow().root();
        let mut guard = dest.borrow_mut();
        let result = NodeFactory::new(&mut guard, &dest, root).build(&Input::from(f64::INFINITY));

        assert!(matches!(result, Err(EditorError::UnsupportedValueKind(_))));
    }

    #[test]
    fn test_identifier_must_be_a_member_path() {
        let dest = empty();
        let root = dest.borrow().root();
        let mut guard = dest.borrow_mut();
        let mut factory = NodeFactory::new(&mut guard, &dest, root);

        assert!(factory.build(&Input::identifier("process.env")).is_ok());
        assert!(matches!(
            factory.build(&Input::identifier("a b")),
            Err(EditorError::UnsupportedValueKind(_))
        ));
    }

    #[test]
    fn test_key_style() {
        assert_eq!(key_style("foo"), KeyStyle::Identifier);
        assert_eq!(key_style("42"), KeyStyle::Numeric);
        assert_eq!(key_style("042"), KeyStyle::Quoted);
        assert_eq!(key_style("a-b"), KeyStyle::Quoted);
    }
}
