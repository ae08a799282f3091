//! # View Bindings
//!
//! A [`ViewBinding`] connects one live view to one tree node. Bindings
//! are cheap handles: clones share a slot, so a binding created for a
//! location that does not exist yet (a *pending* binding) becomes bound
//! for every clone at once when the first write materializes it.
//!
//! Bindings never keep a `RefCell` borrow alive past the call that took
//! it, so user callbacks (e.g. `find` predicates) are free to mutate the
//! same tree.

use crate::array::{self, ArrayView};
use crate::call::CallView;
use crate::errors::{EditResult, EditorError};
use crate::module;
use crate::object::{self, ObjectView};
use crate::value::{Key, Value};
use castwork_parser::ast::Literal;
use castwork_parser::{NodeId, NodeKind, SharedTree, Tree};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Container shape a pending binding materializes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Object,
    Array,
}

impl Shape {
    fn matches(self, kind: Option<&NodeKind>) -> bool {
        matches!(
            (self, kind),
            (Shape::Object, Some(NodeKind::Object { .. })) | (Shape::Array, Some(NodeKind::Array { .. }))
        )
    }

    fn name(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::Array => "array",
        }
    }

    fn empty(self) -> NodeKind {
        match self {
            Shape::Object => NodeKind::Object { properties: Vec::new() },
            Shape::Array => NodeKind::Array { elements: Vec::new() },
        }
    }
}

enum Slot {
    Bound { tree: SharedTree, node: NodeId },
    Pending { parent: ViewBinding, key: Key, shape: Shape },
}

/// Connection between a view and the node it reads and writes
#[derive(Clone)]
pub struct ViewBinding {
    slot: Rc<RefCell<Slot>>,
}

impl ViewBinding {
    /// Bind to an existing node; `node` must not be a reference
    pub(crate) fn bound(tree: SharedTree, node: NodeId) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Bound { tree, node })),
        }
    }

    /// Bind to `parent[key]`, which will be created as an empty `shape`
    /// container on first write
    pub(crate) fn pending(parent: ViewBinding, key: Key, shape: Shape) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Pending { parent, key, shape })),
        }
    }

    /// Tree and node this binding currently points at
    ///
    /// A pending binding picks up a container that another view created
    /// at its location in the meantime.
    pub fn target(&self) -> Option<(SharedTree, NodeId)> {
        let (parent, key, shape) = match &*self.slot.borrow() {
            Slot::Bound { tree, node } => return Some((tree.clone(), *node)),
            Slot::Pending { parent, key, shape } => (parent.clone(), key.clone(), *shape),
        };

        let (parent_tree, parent_node) = parent.target()?;
        let child = child_at(&parent_tree.borrow(), parent_node, &key)?;
        let (tree, node) = resolve(&parent_tree, child);
        if !shape.matches(tree.borrow().kind(node)) {
            return None;
        }

        *self.slot.borrow_mut() = Slot::Bound {
            tree: tree.clone(),
            node,
        };
        Some((tree, node))
    }

    pub fn node(&self) -> Option<NodeId> {
        self.target().map(|(_, node)| node)
    }

    pub fn is_pending(&self) -> bool {
        matches!(&*self.slot.borrow(), Slot::Pending { .. })
    }

    /// Ensure the bound node exists, creating it (and any pending
    /// ancestors) when needed
    pub(crate) fn materialize(&self) -> EditResult<(SharedTree, NodeId)> {
        if let Some(target) = self.target() {
            return Ok(target);
        }

        let (parent, key, shape) = match &*self.slot.borrow() {
            Slot::Bound { tree, node } => return Ok((tree.clone(), *node)),
            Slot::Pending { parent, key, shape } => (parent.clone(), key.clone(), *shape),
        };

        let (tree, parent_node) = parent.materialize()?;
        // Another write may have put a non-container at this key
        let existing = child_at(&tree.borrow(), parent_node, &key);
        if let Some(existing) = existing {
            let found = decode(&tree, existing);
            if !found.is_undefined() {
                return Err(EditorError::TypeMismatch {
                    key: key.to_name(),
                    expected: shape.name(),
                    found: found.type_name(),
                });
            }
        }

        let node = {
            let mut guard = tree.borrow_mut();
            let node = guard.alloc(shape.empty(), None);
            attach(&mut guard, parent_node, &key, node)?;
            node
        };
        trace!(%node, %key, "materialized pending binding");

        *self.slot.borrow_mut() = Slot::Bound {
            tree: tree.clone(),
            node,
        };
        Ok((tree, node))
    }

    /// Run a mutation against the materialized node
    pub(crate) fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Tree, NodeId, &SharedTree) -> EditResult<R>,
    ) -> EditResult<R> {
        let (tree, node) = self.materialize()?;
        let mut guard = tree.borrow_mut();
        f(&mut guard, node, &tree)
    }

    /// Read the bound node; `None` while pending
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tree, NodeId, &SharedTree) -> R) -> Option<R> {
        let (tree, node) = self.target()?;
        let guard = tree.borrow();
        Some(f(&guard, node, &tree))
    }

    /// Whether both bindings address the same node of the same tree
    pub fn same_node(&self, other: &ViewBinding) -> bool {
        if Rc::ptr_eq(&self.slot, &other.slot) {
            return true;
        }
        match (self.target(), other.target()) {
            (Some((a, x)), Some((b, y))) => Rc::ptr_eq(&a, &b) && x == y,
            _ => false,
        }
    }
}

impl PartialEq for ViewBinding {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl fmt::Debug for ViewBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.slot.borrow() {
            Slot::Bound { node, .. } => f.debug_struct("ViewBinding").field("node", node).finish(),
            Slot::Pending { key, shape, .. } => f
                .debug_struct("ViewBinding")
                .field("pending", key)
                .field("shape", shape)
                .finish(),
        }
    }
}

/// Follow reference nodes to the node that holds the value
pub(crate) fn resolve(tree: &SharedTree, id: NodeId) -> (SharedTree, NodeId) {
    let mut current = (tree.clone(), id);
    loop {
        let next = match current.0.borrow().kind(current.1) {
            Some(NodeKind::Reference { tree: other, target }) => {
                Some((other.clone().unwrap_or_else(|| current.0.clone()), *target))
            }
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Decode a node into a primitive or a further view
pub(crate) fn decode(tree: &SharedTree, id: NodeId) -> Value {
    let (tree, id) = resolve(tree, id);
    let kind = tree.borrow().kind(id).cloned();

    match kind {
        Some(NodeKind::Object { .. }) => Value::Object(ObjectView::new(ViewBinding::bound(tree, id))),
        Some(NodeKind::Array { .. }) => Value::Array(ArrayView::new(ViewBinding::bound(tree, id))),
        Some(NodeKind::Call { .. }) => Value::Call(CallView::new(ViewBinding::bound(tree, id))),
        Some(NodeKind::Literal(literal)) => match literal {
            Literal::String(value) => Value::String(value),
            Literal::Number(value) => Value::Number(value),
            Literal::Boolean(value) => Value::Bool(value),
            Literal::Null => Value::Null,
            Literal::Undefined => Value::Undefined,
        },
        Some(NodeKind::Template { raw }) => Value::String(raw),
        Some(NodeKind::Identifier { name }) => Value::Identifier(name),
        _ => Value::Undefined,
    }
}

/// Child of a container addressed by `key`; holes count as absent
pub(crate) fn child_at(tree: &Tree, container: NodeId, key: &Key) -> Option<NodeId> {
    match tree.kind(container)? {
        NodeKind::Object { properties } => object::find_property(tree, properties, &key.to_name())
            .and_then(|property| match tree.kind(property) {
                Some(NodeKind::Property { value, .. }) => Some(*value),
                _ => None,
            }),
        NodeKind::Array { elements } => {
            let element = *elements.get(key.as_index()?)?;
            match tree.kind(element) {
                Some(NodeKind::Hole) => None,
                _ => Some(element),
            }
        }
        NodeKind::Call { arguments, .. } => arguments.get(key.as_index()?).copied(),
        NodeKind::Program { .. } => module::find_export(tree, &key.to_name())
            .and_then(|statement| module::export_value(tree, statement)),
        _ => None,
    }
}

/// Place `value` under `container` at `key`, replacing what was there
pub(crate) fn attach(tree: &mut Tree, container: NodeId, key: &Key, value: NodeId) -> EditResult<()> {
    match tree.kind(container) {
        Some(NodeKind::Object { .. }) => {
            object::put_property(tree, container, &key.to_name(), value);
            Ok(())
        }
        Some(NodeKind::Array { .. }) => {
            let index = key.as_index().ok_or_else(|| EditorError::TypeMismatch {
                key: key.to_name(),
                expected: "array index",
                found: "property name",
            })?;
            array::put_element(tree, container, index, value)
        }
        Some(NodeKind::Program { .. }) => module::put_export(tree, container, &key.to_name(), value),
        Some(NodeKind::Call { .. }) => Err(EditorError::ReadOnlyView { kind: "function-call" }),
        Some(kind) => Err(EditorError::UnsupportedValueKind(format!(
            "cannot attach a value to a {} node",
            kind.name()
        ))),
        None => Err(EditorError::Detached),
    }
}

/// Record that the shape of `id` changed
pub(crate) fn mark(tree: &mut Tree, id: NodeId) {
    if tree.mark_dirty(id) {
        trace!(node = %id, "marked dirty");
    }
}

/// Unlink a node that was replaced or removed; it stays readable
pub(crate) fn detach(tree: &mut Tree, id: NodeId) {
    tree.set_parent(id, None);
}
