use crate::binding::{decode, ViewBinding};
use crate::errors::{EditResult, EditorError};
use crate::value::{Input, Key, Value};
use crate::view::{View, ViewKind};
use castwork_parser::NodeKind;
use serde_json::{json, Map};

/// Read-only view over a call expression such as `defineConfig({ … })`
///
/// The callee and the argument list cannot be changed, but every argument
/// decodes to a full view, so `call.argument(0)` can be edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CallView {
    binding: ViewBinding,
}

impl CallView {
    pub(crate) fn new(binding: ViewBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    /// Callee name, dotted for member calls (`a.b`)
    pub fn callee(&self) -> String {
        self.binding
            .read(|tree, node, _| match tree.kind(node) {
                Some(NodeKind::Call { callee, .. }) => callee.clone(),
                _ => String::new(),
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.binding
            .read(|tree, node, _| match tree.kind(node) {
                Some(NodeKind::Call { arguments, .. }) => arguments.len(),
                _ => 0,
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn argument(&self, index: usize) -> Value {
        self.binding
            .read(|tree, node, shared| match tree.kind(node) {
                Some(NodeKind::Call { arguments, .. }) => {
                    arguments.get(index).map(|argument| decode(shared, *argument))
                }
                _ => None,
            })
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    pub fn arguments(&self) -> Vec<Value> {
        (0..self.len()).map(|index| self.argument(index)).collect()
    }

    /// `{"$type": "function-call", "$callee": …, "$args": […]}`
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = Map::new();
        map.insert("$type".to_string(), json!("function-call"));
        map.insert("$callee".to_string(), json!(self.callee()));
        map.insert(
            "$args".to_string(),
            serde_json::Value::Array(self.arguments().iter().map(Value::to_json).collect()),
        );
        serde_json::Value::Object(map)
    }
}

impl View for CallView {
    fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    fn kind(&self) -> ViewKind {
        ViewKind::FunctionCall
    }

    fn get(&self, key: &Key) -> Value {
        match key.as_index() {
            Some(index) => self.argument(index),
            None => match key.to_name().as_str() {
                "$callee" => Value::String(self.callee()),
                "length" => Value::Number(self.len() as f64),
                _ => Value::Undefined,
            },
        }
    }

    fn set(&self, _key: &Key, _value: Input) -> EditResult<()> {
        Err(EditorError::ReadOnlyView {
            kind: ViewKind::FunctionCall.as_str(),
        })
    }

    fn delete(&self, _key: &Key) -> EditResult<bool> {
        Err(EditorError::ReadOnlyView {
            kind: ViewKind::FunctionCall.as_str(),
        })
    }

    fn keys(&self) -> Vec<Key> {
        (0..self.len()).map(Key::Index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;

    #[test]
    fn test_call_view_exposes_callee_and_arguments() {
        let module = Module::from_source("export default defineConfig({ base: '/' }, 2)").unwrap();
        let Value::Call(call) = module.exports().get("default") else {
            panic!("Expected call");
        };

        assert_eq!(call.kind(), ViewKind::FunctionCall);
        assert_eq!(call.callee(), "defineConfig");
        assert_eq!(call.len(), 2);
        assert_eq!(call.argument(1), Value::Number(2.0));
        assert_eq!(call.argument(5), Value::Undefined);
        assert_eq!(View::get(&call, &Key::from("$callee")), Value::String("defineConfig".to_string()));
        assert_eq!(
            call.to_json(),
            json!({ "$type": "function-call", "$callee": "defineConfig", "$args": [{ "base": "/" }, 2.0] })
        );
    }

    #[test]
    fn test_call_view_is_read_only() {
        let module = Module::from_source("export default f(1)").unwrap();
        let Value::Call(call) = module.exports().get("default") else {
            panic!("Expected call");
        };

        assert!(matches!(
            View::set(&call, &Key::Index(0), Input::from(2)),
            Err(EditorError::ReadOnlyView { .. })
        ));
        assert!(View::delete(&call, &Key::Index(0)).is_err());
    }

    #[test]
    fn test_argument_edits_reach_generated_code() {
        let module = Module::from_source("export default defineConfig({\n  plugins: [],\n})\n").unwrap();
        let Value::Call(call) = module.exports().get("default") else {
            panic!("Expected call");
        };
        let options = call.argument(0).as_object().cloned().unwrap();

        // Call expressions cannot be built through assignment
        let plugins = options.array_entry("plugins").unwrap();
        assert!(plugins.push(vec![Input::identifier("vue()")]).is_err());
        assert!(plugins.is_empty());

        options.set("base", "/app/").unwrap();

        assert_eq!(
            module.generate().unwrap().code,
            "export default defineConfig({\n  plugins: [],\n  base: \"/app/\",\n})\n"
        );
    }
}
