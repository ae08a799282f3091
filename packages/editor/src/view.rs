use crate::binding::ViewBinding;
use crate::errors::EditResult;
use crate::value::{Input, Key, Value};

/// Shape of a structural view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Object,
    Array,
    FunctionCall,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Object => "object",
            ViewKind::Array => "array",
            ViewKind::FunctionCall => "function-call",
        }
    }
}

/// Dynamic access to a live view over a tree node
///
/// Each view type implements this trait to provide:
/// - Reads that decode nodes into values or further views
/// - Writes that materialize inputs and mark the changed node dirty
/// - Key enumeration in source order
pub trait View {
    /// Binding to the underlying node
    fn binding(&self) -> &ViewBinding;

    fn kind(&self) -> ViewKind;

    /// Read a key; missing keys decode to `Value::Undefined`
    fn get(&self, key: &Key) -> Value;

    /// Write a key, creating or replacing the entry
    fn set(&self, key: &Key, value: Input) -> EditResult<()>;

    /// Remove a key; returns whether an entry was removed
    fn delete(&self, key: &Key) -> EditResult<bool>;

    fn keys(&self) -> Vec<Key>;
}
