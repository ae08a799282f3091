//! # Object Views
//!
//! Live view over an object literal. Reads decode property values,
//! writes go through the node factory and dirty only what changed:
//! replacing a value dirties its property, adding or removing a key
//! dirties the object.

use crate::array::ArrayView;
use crate::binding::{child_at, decode, detach, mark, Shape, ViewBinding};
use crate::errors::{EditResult, EditorError};
use crate::factory::{key_style, prepare, NodeFactory};
use crate::value::{Input, Key, Value};
use crate::view::{View, ViewKind};
use castwork_parser::{NodeId, NodeKind, Tree};
use serde_json::Map;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectView {
    binding: ViewBinding,
}

impl ObjectView {
    pub(crate) fn new(binding: ViewBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    /// Value of `key`, or `Value::Undefined` when absent
    pub fn get(&self, key: impl Into<Key>) -> Value {
        let key = key.into();
        self.binding
            .read(|tree, node, shared| child_at(tree, node, &key).map(|child| decode(shared, child)))
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    /// Create or replace `key`; existing keys keep their position
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Input>) -> EditResult<()> {
        let key = key.into();
        let input = value.into();
        prepare([&input])?;

        self.binding.mutate(|tree, node, shared| {
            let value = NodeFactory::new(tree, shared, node).build(&input)?;
            put_property(tree, node, &key.to_name(), value);
            debug!(%node, %key, "set property");
            Ok(())
        })
    }

    /// Remove every entry named `key`
    pub fn delete(&self, key: impl Into<Key>) -> EditResult<bool> {
        let key = key.into();
        if self.binding.target().is_none() {
            return Ok(false);
        }

        self.binding.mutate(|tree, node, _| {
            let removed = delete_property(tree, node, &key.to_name());
            if removed {
                debug!(%node, %key, "deleted property");
            }
            Ok(removed)
        })
    }

    /// Keys in first-seen source order, then in order of addition
    pub fn keys(&self) -> Vec<String> {
        self.binding
            .read(|tree, node, _| {
                let mut keys: Vec<String> = Vec::new();
                for property in properties(tree, node) {
                    if let Some(NodeKind::Property { key, .. }) = tree.kind(*property) {
                        if !keys.contains(key) {
                            keys.push(key.clone());
                        }
                    }
                }
                keys
            })
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        let name = key.into().to_name();
        self.keys().iter().any(|key| *key == name)
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.keys()
            .into_iter()
            .map(|key| {
                let value = self.get(key.as_str());
                (key, value)
            })
            .collect()
    }

    /// Object stored at `key`, created on first write if missing
    pub fn object_entry(&self, key: impl Into<Key>) -> EditResult<ObjectView> {
        let key = key.into();
        match self.get(key.clone()) {
            Value::Object(view) => Ok(view),
            Value::Undefined => Ok(ObjectView::new(ViewBinding::pending(
                self.binding.clone(),
                key,
                Shape::Object,
            ))),
            other => Err(EditorError::TypeMismatch {
                key: key.to_name(),
                expected: "object",
                found: other.type_name(),
            }),
        }
    }

    /// Array stored at `key`, created on first write if missing
    pub fn array_entry(&self, key: impl Into<Key>) -> EditResult<ArrayView> {
        let key = key.into();
        match self.get(key.clone()) {
            Value::Array(view) => Ok(view),
            Value::Undefined => Ok(ArrayView::new(ViewBinding::pending(
                self.binding.clone(),
                key,
                Shape::Array,
            ))),
            other => Err(EditorError::TypeMismatch {
                key: key.to_name(),
                expected: "array",
                found: other.type_name(),
            }),
        }
    }

    /// `self[key] ||= value`; returns the resulting value
    pub fn or_assign(&self, key: impl Into<Key>, value: impl Into<Input>) -> EditResult<Value> {
        let key = key.into();
        let current = self.get(key.clone());
        if current.is_truthy() {
            return Ok(current);
        }
        self.set(key.clone(), value)?;
        Ok(self.get(key))
    }

    /// `self[key] ??= value`; returns the resulting value
    pub fn nullish_assign(&self, key: impl Into<Key>, value: impl Into<Input>) -> EditResult<Value> {
        let key = key.into();
        let current = self.get(key.clone());
        if !current.is_nullish() {
            return Ok(current);
        }
        self.set(key.clone(), value)?;
        Ok(self.get(key))
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = Map::new();
        for (key, value) in self.entries() {
            map.insert(key, value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

impl View for ObjectView {
    fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Object
    }

    fn get(&self, key: &Key) -> Value {
        ObjectView::get(self, key.clone())
    }

    fn set(&self, key: &Key, value: Input) -> EditResult<()> {
        ObjectView::set(self, key.clone(), value)
    }

    fn delete(&self, key: &Key) -> EditResult<bool> {
        ObjectView::delete(self, key.clone())
    }

    fn keys(&self) -> Vec<Key> {
        ObjectView::keys(self).into_iter().map(Key::Name).collect()
    }
}

fn properties(tree: &Tree, object: NodeId) -> &[NodeId] {
    match tree.kind(object) {
        Some(NodeKind::Object { properties }) => properties,
        _ => &[],
    }
}

/// Last property named `name`; later duplicates win, as in JS
pub(crate) fn find_property(tree: &Tree, properties: &[NodeId], name: &str) -> Option<NodeId> {
    properties
        .iter()
        .rev()
        .find(|property| matches!(tree.kind(**property), Some(NodeKind::Property { key, .. }) if key == name))
        .copied()
}

/// Link `value` as the value of `name`, replacing in place or appending
pub(crate) fn put_property(tree: &mut Tree, object: NodeId, name: &str, value: NodeId) {
    match find_property(tree, properties(tree, object), name) {
        Some(property) => {
            let previous = match tree.kind_mut(property) {
                Some(NodeKind::Property {
                    value: slot,
                    shorthand,
                    ..
                }) => {
                    *shorthand = false;
                    Some(std::mem::replace(slot, value))
                }
                _ => None,
            };
            if let Some(previous) = previous {
                detach(tree, previous);
            }
            tree.set_parent(value, Some(property));
            mark(tree, property);
        }
        None => {
            let property = tree.alloc(
                NodeKind::Property {
                    key: name.to_string(),
                    key_style: key_style(name),
                    value,
                    shorthand: false,
                },
                None,
            );
            tree.set_parent(value, Some(property));
            tree.set_parent(property, Some(object));
            if let Some(NodeKind::Object { properties }) = tree.kind_mut(object) {
                properties.push(property);
            }
            mark(tree, object);
        }
    }
}

fn delete_property(tree: &mut Tree, object: NodeId, name: &str) -> bool {
    let removed: Vec<NodeId> = properties(tree, object)
        .iter()
        .copied()
        .filter(|property| matches!(tree.kind(*property), Some(NodeKind::Property { key, .. }) if key == name))
        .collect();
    if removed.is_empty() {
        return false;
    }

    if let Some(NodeKind::Object { properties }) = tree.kind_mut(object) {
        properties.retain(|property| !removed.contains(property));
    }
    for property in removed {
        detach(tree, property);
    }
    mark(tree, object);
    true
}
