//! # Array Views
//!
//! Live view over an array literal with native sequence semantics:
//! `len` counts holes, deleting an index leaves a hole in place, writes
//! past the end pad with holes, and `splice` clamps its range the way
//! `Array.prototype.splice` does. Any change to the slot list dirties
//! the array node. A single write pads at most [`MAX_HOLE_PADDING`] holes.

use crate::binding::{decode, detach, mark, ViewBinding};
use crate::errors::{EditResult, EditorError};
use crate::factory::{prepare, NodeFactory};
use crate::value::{Input, Key, Value};
use crate::view::{View, ViewKind};
use castwork_parser::{NodeId, NodeKind, Tree};
use tracing::debug;

/// Most holes one write may pad an array with
pub const MAX_HOLE_PADDING: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayView {
    binding: ViewBinding,
}

impl ArrayView {
    pub(crate) fn new(binding: ViewBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    /// Number of slots, holes included
    pub fn len(&self) -> usize {
        self.binding
            .read(|tree, node, _| elements(tree, node).len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`; holes and out-of-range indices are undefined
    pub fn get(&self, index: usize) -> Value {
        self.binding
            .read(|tree, node, shared| {
                let element = *elements(tree, node).get(index)?;
                match tree.kind(element) {
                    Some(NodeKind::Hole) => None,
                    _ => Some(decode(shared, element)),
                }
            })
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    /// Replace the slot at `index`, padding with holes past the end
    pub fn set(&self, index: usize, value: impl Into<Input>) -> EditResult<()> {
        let input = value.into();
        prepare([&input])?;

        self.binding.mutate(|tree, node, shared| {
            check_padding(tree, node, index)?;
            let value = NodeFactory::new(tree, shared, node).build(&input)?;
            put_element(tree, node, index, value)?;
            debug!(%node, index, "set element");
            Ok(())
        })
    }

    /// Turn the slot at `index` into a hole; length is unchanged
    pub fn delete(&self, index: usize) -> EditResult<bool> {
        if index >= self.len() {
            return Ok(false);
        }

        self.binding.mutate(|tree, node, _| {
            let hole = tree.alloc(NodeKind::Hole, None);
            put_element(tree, node, index, hole)?;
            debug!(%node, index, "deleted element");
            Ok(true)
        })
    }

    /// Append values; returns the new length
    pub fn push<I>(&self, values: impl IntoIterator<Item = I>) -> EditResult<usize>
    where
        I: Into<Input>,
    {
        let start = self.len() as isize;
        self.splice(start, Some(0), values)?;
        Ok(self.len())
    }

    /// Prepend values keeping their order; returns the new length
    pub fn unshift<I>(&self, values: impl IntoIterator<Item = I>) -> EditResult<usize>
    where
        I: Into<Input>,
    {
        self.splice(0, Some(0), values)?;
        Ok(self.len())
    }

    /// Remove and return the last element
    pub fn pop(&self) -> EditResult<Value> {
        let removed = self.splice(-1, Some(1), Vec::<Input>::new())?;
        Ok(removed.into_iter().next().unwrap_or(Value::Undefined))
    }

    /// Remove and return the first element
    pub fn shift(&self) -> EditResult<Value> {
        let removed = self.splice(0, Some(1), Vec::<Input>::new())?;
        Ok(removed.into_iter().next().unwrap_or(Value::Undefined))
    }

    /// Remove `delete_count` slots at `start` and insert `items` there
    ///
    /// Negative `start` counts from the end; both bounds are clamped.
    /// `None` removes everything from `start` on. Returns the removed
    /// slots decoded, holes as `Value::Undefined`.
    pub fn splice<I>(
        &self,
        start: isize,
        delete_count: Option<usize>,
        items: impl IntoIterator<Item = I>,
    ) -> EditResult<Vec<Value>>
    where
        I: Into<Input>,
    {
        let items: Vec<Input> = items.into_iter().map(Into::into).collect();
        let len = self.len();
        let start = if start < 0 {
            len.saturating_sub(start.unsigned_abs())
        } else {
            (start as usize).min(len)
        };
        let delete_count = delete_count.unwrap_or(len - start).min(len - start);

        if delete_count == 0 && items.is_empty() {
            return Ok(Vec::new());
        }
        prepare(&items)?;

        let (shared, removed) = self.binding.mutate(|tree, node, shared| {
            let mut inserted = Vec::with_capacity(items.len());
            {
                let mut factory = NodeFactory::new(tree, shared, node);
                for item in &items {
                    inserted.push(factory.build(item)?);
                }
            }
            for element in &inserted {
                tree.set_parent(*element, Some(node));
            }

            let removed: Vec<NodeId> = match tree.kind_mut(node) {
                Some(NodeKind::Array { elements }) => elements
                    .splice(start..start + delete_count, inserted)
                    .collect(),
                _ => return Err(EditorError::Detached),
            };
            for element in &removed {
                detach(tree, *element);
            }
            mark(tree, node);
            debug!(%node, start, removed = removed.len(), inserted = items.len(), "spliced array");
            Ok((shared.clone(), removed))
        })?;

        let holes: Vec<bool> = {
            let tree = shared.borrow();
            removed
                .iter()
                .map(|element| matches!(tree.kind(*element), Some(NodeKind::Hole)))
                .collect()
        };
        Ok(removed
            .into_iter()
            .zip(holes)
            .map(|(element, hole)| if hole { Value::Undefined } else { decode(&shared, element) })
            .collect())
    }

    /// Whether any element equals `value` (SameValueZero for primitives,
    /// node identity for views)
    pub fn includes(&self, value: impl Into<Input>) -> bool {
        self.index_of(value).is_some()
    }

    pub fn index_of(&self, value: impl Into<Input>) -> Option<usize> {
        let value = value.into();
        self.iter().position(|element| value.matches(&element))
    }

    /// First element for which `predicate(element, index, array)` holds
    ///
    /// The predicate may mutate the array; the length is re-read after
    /// every call.
    pub fn find(&self, mut predicate: impl FnMut(&Value, usize, &ArrayView) -> bool) -> Option<Value> {
        let mut index = 0;
        while index < self.len() {
            let element = self.get(index);
            if predicate(&element, index, self) {
                return Some(element);
            }
            index += 1;
        }
        None
    }

    pub fn find_index(
        &self,
        mut predicate: impl FnMut(&Value, usize, &ArrayView) -> bool,
    ) -> Option<usize> {
        let mut index = 0;
        while index < self.len() {
            let element = self.get(index);
            if predicate(&element, index, self) {
                return Some(index);
            }
            index += 1;
        }
        None
    }

    /// `self[index] ||= value`
    pub fn or_assign(&self, index: usize, value: impl Into<Input>) -> EditResult<Value> {
        let current = self.get(index);
        if current.is_truthy() {
            return Ok(current);
        }
        self.set(index, value)?;
        Ok(self.get(index))
    }

    /// `self[index] ??= value`
    pub fn nullish_assign(&self, index: usize, value: impl Into<Input>) -> EditResult<Value> {
        let current = self.get(index);
        if !current.is_nullish() {
            return Ok(current);
        }
        self.set(index, value)?;
        Ok(self.get(index))
    }

    /// Lazy iterator over decoded elements in slot order
    pub fn iter(&self) -> Iter {
        Iter {
            array: self.clone(),
            index: 0,
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.iter().map(|element| element.to_json()).collect())
    }
}

/// Iterator over an array view; reads the live length on every step
#[derive(Debug, Clone)]
pub struct Iter {
    array: ArrayView,
    index: usize,
}

impl Iterator for Iter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.index >= self.array.len() {
            return None;
        }
        let element = self.array.get(self.index);
        self.index += 1;
        Some(element)
    }
}

impl IntoIterator for &ArrayView {
    type Item = Value;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl View for ArrayView {
    fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Array
    }

    fn get(&self, key: &Key) -> Value {
        match key.as_index() {
            Some(index) => ArrayView::get(self, index),
            None if key.to_name() == "length" => Value::Number(self.len() as f64),
            None => Value::Undefined,
        }
    }

    fn set(&self, key: &Key, value: Input) -> EditResult<()> {
        let index = key.as_index().ok_or_else(|| EditorError::TypeMismatch {
            key: key.to_name(),
            expected: "array index",
            found: "property name",
        })?;
        ArrayView::set(self, index, value)
    }

    fn delete(&self, key: &Key) -> EditResult<bool> {
        match key.as_index() {
            Some(index) => ArrayView::delete(self, index),
            None => Ok(false),
        }
    }

    fn keys(&self) -> Vec<Key> {
        (0..self.len()).map(Key::Index).collect()
    }
}

fn elements(tree: &Tree, array: NodeId) -> &[NodeId] {
    match tree.kind(array) {
        Some(NodeKind::Array { elements }) => elements,
        _ => &[],
    }
}

fn check_padding(tree: &Tree, array: NodeId, index: usize) -> EditResult<()> {
    let len = elements(tree, array).len();
    if index.saturating_sub(len) > MAX_HOLE_PADDING {
        return Err(EditorError::UnsupportedValueKind(format!(
            "index {} would pad an array of length {} with more than {} holes",
            index, len, MAX_HOLE_PADDING
        )));
    }
    Ok(())
}

/// Put `value` in slot `index`, padding with holes past the end
pub(crate) fn put_element(tree: &mut Tree, array: NodeId, index: usize, value: NodeId) -> EditResult<()> {
    check_padding(tree, array, index)?;
    let len = elements(tree, array).len();
    let mut holes = Vec::new();
    for _ in len..index {
        let hole = tree.alloc(NodeKind::Hole, None);
        tree.set_parent(hole, Some(array));
        holes.push(hole);
    }

    let previous = match tree.kind_mut(array) {
        Some(NodeKind::Array { elements }) => {
            elements.extend(holes);
            if index < elements.len() {
                Some(std::mem::replace(&mut elements[index], value))
            } else {
                elements.push(value);
                None
            }
        }
        _ => None,
    };
    if let Some(previous) = previous {
        detach(tree, previous);
    }
    tree.set_parent(value, Some(array));
    mark(tree, array);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use serde_json::json;

    fn list(source: &str) -> (Module, ArrayView) {
        let module = Module::from_source(source).unwrap();
        let view = module.exports().get("default").as_array().cloned().unwrap();
        (module, view)
    }

    #[test]
    fn test_splice_returns_removed_and_inserts() {
        let (module, array) = list("export default [1, 2, 3, 4, 5]");

        let removed = array
            .splice(1, Some(3), vec![Input::from(json!({ "foo": "bar" })), Input::from("bar")])
            .unwrap();

        assert_eq!(removed, vec![Value::Number(2.0), Value::Number(3.0), Value::Number(4.0)]);
        assert_eq!(array.to_json(), json!([1.0, { "foo": "bar" }, "bar", 5.0]));
        assert_eq!(
            module.generate().unwrap().code,
            "export default [1, { foo: \"bar\" }, \"bar\", 5]"
        );
    }

    #[test]
    fn test_splice_clamps_and_counts_from_end() {
        let (_module, array) = list("export default [1, 2, 3]");

        assert_eq!(array.splice(-2, None, Vec::<Input>::new()).unwrap().len(), 2);
        assert_eq!(array.splice(10, Some(5), vec![4]).unwrap(), Vec::<Value>::new());
        assert_eq!(array.to_json(), json!([1.0, 4.0]));
        assert_eq!(array.splice(-10, Some(1), Vec::<Input>::new()).unwrap(), vec![Value::Number(1.0)]);
    }

    #[test]
    fn test_noop_splice_leaves_output_untouched() {
        let (module, array) = list("export default [1,2]");

        array.splice(1, Some(0), Vec::<Input>::new()).unwrap();
        assert_eq!(module.generate().unwrap().code, "export default [1,2]");
    }

    #[test]
    fn test_delete_leaves_hole() {
        let (module, array) = list("export default [1, 2, 3]");

        assert!(array.delete(1).unwrap());
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(1), Value::Undefined);
        assert_eq!(array.get(2), Value::Number(3.0));
        assert_eq!(module.generate().unwrap().code, "export default [1, , 3]");
    }

    #[test]
    fn test_set_past_end_pads_with_holes() {
        let (module, array) = list("export default [1]");

        array.set(3, "x").unwrap();
        assert_eq!(array.len(), 4);
        assert_eq!(array.get(2), Value::Undefined);
        assert_eq!(module.generate().unwrap().code, "export default [1, , , \"x\"]");
    }

    #[test]
    fn test_far_index_is_rejected_without_padding() {
        let (module, array) = list("export default [1]");

        let result = array.set(u32::MAX as usize, 2);
        assert!(matches!(result, Err(EditorError::UnsupportedValueKind(_))));
        assert!(array.set(2 + MAX_HOLE_PADDING, 2).is_err());
        assert_eq!(array.len(), 1);
        assert!(!module.is_modified());
        assert_eq!(module.generate().unwrap().code, "export default [1]");

        array.set(1 + MAX_HOLE_PADDING, 2).unwrap();
        assert_eq!(array.len(), 2 + MAX_HOLE_PADDING);
    }

    #[test]
    fn test_push_unshift_pop_shift() {
        let (_module, array) = list("export default ['b']");

        assert_eq!(array.push(vec!["c", "d"]).unwrap(), 3);
        assert_eq!(array.unshift(vec!["a"]).unwrap(), 4);
        assert_eq!(array.pop().unwrap(), Value::String("d".to_string()));
        assert_eq!(array.shift().unwrap(), Value::String("a".to_string()));
        assert_eq!(array.to_json(), json!(["b", "c"]));

        let (_module, empty) = list("export default []");
        assert_eq!(empty.pop().unwrap(), Value::Undefined);
    }

    #[test]
    fn test_search_methods() {
        let (_module, array) = list("export default [1, 'two', { three: 3 }, null]");

        assert!(array.includes(1));
        assert!(array.includes("two"));
        assert!(!array.includes(json!({ "three": 3 })));
        assert_eq!(array.index_of("two"), Some(1));
        assert_eq!(array.index_of(42), None);

        let object = array
            .find(|element, _, _| element.as_object().is_some())
            .unwrap();
        assert!(array.includes(object.as_object().unwrap()));
        assert_eq!(array.find_index(|element, index, _| index > 0 && element.is_truthy()), Some(1));
        assert_eq!(array.find(|_, _, _| false), None);
    }

    #[test]
    fn test_find_predicate_may_mutate() {
        let (_module, array) = list("export default [1, 2]");

        let found = array.find(|element, _, array| {
            if *element == Value::Number(1.0) {
                array.push(vec![3]).unwrap();
            }
            *element == Value::Number(3.0)
        });
        assert_eq!(found, Some(Value::Number(3.0)));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let (_module, array) = list("export default [1, , 3]");

        let first: Vec<Value> = array.iter().collect();
        let second: Vec<Value> = (&array).into_iter().collect();
        assert_eq!(first, vec![Value::Number(1.0), Value::Undefined, Value::Number(3.0)]);
        assert_eq!(first, second);
    }
}
