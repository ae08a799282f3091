//! Decoded values and assignable inputs
//!
//! Every read through a view yields a [`Value`]: primitives come back
//! decoded, containers and calls come back as further views. Every write
//! accepts an [`Input`], which the node factory turns into tree nodes.

use crate::array::ArrayView;
use crate::binding::ViewBinding;
use crate::call::CallView;
use crate::errors::{EditResult, EditorError};
use crate::object::ObjectView;
use serde::Serialize;
use serde_json::{json, Map};
use std::fmt;

/// Property name or array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl Key {
    /// Array index this key addresses, accepting canonical numeric names
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(name) => name
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == *name),
        }
    }

    pub fn to_name(&self) -> String {
        match self {
            Key::Name(name) => name.clone(),
            Key::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// A decoded read result
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(ObjectView),
    Array(ArrayView),
    Call(CallView),
    /// Identifier reference or dotted member path
    Identifier(String),
}

impl Value {
    /// Type discriminator
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Call(_) => "function-call",
            Value::Identifier(_) => "identifier",
        }
    }

    /// JS truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""`
    /// are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(value) => *value,
            Value::Number(value) => *value != 0.0 && !value.is_nan(),
            Value::String(value) => !value.is_empty(),
            Value::Object(_) | Value::Array(_) | Value::Call(_) | Value::Identifier(_) => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_object(&self) -> Option<&ObjectView> {
        match self {
            Value::Object(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            Value::Array(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallView> {
        match self {
            Value::Call(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Plain data form; `undefined` becomes `null`, calls and identifiers
    /// become `{"$type": …}` descriptors
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(value) => json!(value),
            Value::Number(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(value) => json!(value),
            Value::Object(view) => view.to_json(),
            Value::Array(view) => view.to_json(),
            Value::Call(view) => view.to_json(),
            Value::Identifier(name) => {
                let mut map = Map::new();
                map.insert("$type".to_string(), json!("identifier"));
                map.insert("$name".to_string(), json!(name));
                serde_json::Value::Object(map)
            }
        }
    }

    /// Binding of the view this value carries, if any
    pub(crate) fn binding(&self) -> Option<&ViewBinding> {
        match self {
            Value::Object(view) => Some(view.binding()),
            Value::Array(view) => Some(view.binding()),
            Value::Call(view) => Some(view.binding()),
            _ => None,
        }
    }
}

/// Something that can be written through a view
#[derive(Debug, Clone)]
pub enum Input {
    Undefined,
    /// Plain data: primitives, mappings and sequences
    Data(serde_json::Value),
    Number(f64),
    /// Identifier reference or dotted member path, written bare
    Identifier(String),
    /// An existing node, attached as a shared reference
    View(ViewBinding),
}

impl Input {
    /// Convert any serde-serializable value into plain data
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> EditResult<Self> {
        serde_json::to_value(value)
            .map(Input::Data)
            .map_err(|e| EditorError::UnsupportedValueKind(e.to_string()))
    }

    /// Bare identifier such as `vue` or `process.env`
    pub fn identifier(name: impl Into<String>) -> Self {
        Input::Identifier(name.into())
    }

    /// Whether an array element equals this input under `includes`
    /// semantics: primitives by value (NaN equals NaN), views by node
    /// identity, fresh mappings and sequences never
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Input::Undefined, Value::Undefined) => true,
            (Input::Number(a), Value::Number(b)) => same_value_zero(*a, *b),
            (Input::Identifier(a), Value::Identifier(b)) => a == b,
            (Input::View(binding), value) => value
                .binding()
                .is_some_and(|other| binding.same_node(other)),
            (Input::Data(data), value) => match (data, value) {
                (serde_json::Value::Null, Value::Null) => true,
                (serde_json::Value::Bool(a), Value::Bool(b)) => a == b,
                (serde_json::Value::Number(a), Value::Number(b)) => {
                    a.as_f64().is_some_and(|a| same_value_zero(a, *b))
                }
                (serde_json::Value::String(a), Value::String(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

fn same_value_zero(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl From<()> for Input {
    fn from(_: ()) -> Self {
        Input::Undefined
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Data(json!(value))
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Input::Data(json!(value))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Input::Data(json!(value))
    }
}

impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Input::Number(value)
    }
}

impl From<i64> for Input {
    fn from(value: i64) -> Self {
        Input::Data(json!(value))
    }
}

impl From<i32> for Input {
    fn from(value: i32) -> Self {
        Input::Data(json!(value))
    }
}

impl From<u32> for Input {
    fn from(value: u32) -> Self {
        Input::Data(json!(value))
    }
}

impl From<usize> for Input {
    fn from(value: usize) -> Self {
        Input::Data(json!(value))
    }
}

impl From<serde_json::Value> for Input {
    fn from(value: serde_json::Value) -> Self {
        Input::Data(value)
    }
}

impl From<&ObjectView> for Input {
    fn from(view: &ObjectView) -> Self {
        Input::View(view.binding().clone())
    }
}

impl From<ObjectView> for Input {
    fn from(view: ObjectView) -> Self {
        Input::View(view.binding().clone())
    }
}

impl From<&ArrayView> for Input {
    fn from(view: &ArrayView) -> Self {
        Input::View(view.binding().clone())
    }
}

impl From<ArrayView> for Input {
    fn from(view: ArrayView) -> Self {
        Input::View(view.binding().clone())
    }
}

impl From<&CallView> for Input {
    fn from(view: &CallView) -> Self {
        Input::View(view.binding().clone())
    }
}

impl From<CallView> for Input {
    fn from(view: CallView) -> Self {
        Input::View(view.binding().clone())
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined => Input::Undefined,
            Value::Null => Input::Data(serde_json::Value::Null),
            Value::Bool(value) => value.into(),
            Value::Number(value) => Input::Number(value),
            Value::String(value) => value.into(),
            Value::Identifier(name) => Input::Identifier(name),
            Value::Object(view) => view.into(),
            Value::Array(view) => view.into(),
            Value::Call(view) => view.into(),
        }
    }
}

impl From<&Value> for Input {
    fn from(value: &Value) -> Self {
        value.clone().into()
    }
}
