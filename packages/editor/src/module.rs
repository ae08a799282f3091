//! # Modules
//!
//! A [`Module`] owns one parsed tree and hands out live views into it.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit through views → Generate → Write
//!   ↓      ↓            ↓                 ↓         ↓
//! File   Tree    dirty node ids      stitched     File
//!                                      text
//! ```
//!
//! Dirty state lives as long as the module; generating does not reset it.

use crate::array::ArrayView;
use crate::binding::{decode, detach, mark, Shape, ViewBinding};
use crate::errors::{EditResult, EditorError};
use crate::factory::{prepare, NodeFactory};
use crate::object::ObjectView;
use crate::options::GenerateOptions;
use crate::value::{Input, Key, Value};
use crate::view::{View, ViewKind};
use castwork_parser::ast::{DeclarationKind, ImportSpecifier};
use castwork_parser::serializer::is_identifier;
use castwork_parser::{format_errors, get_module_id, parse, LosslessSerializer, NodeId, NodeKind, SharedTree, Tree};
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, instrument, warn};

/// Words that cannot name an exported binding
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "delete", "do", "else",
    "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "let", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Result of [`Module::generate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub code: String,
}

/// One import declaration, read-only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDeclaration {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
}

/// Editable module
#[derive(Debug)]
pub struct Module {
    tree: SharedTree,
    path: Option<PathBuf>,
    id: String,
}

impl Module {
    /// Parse source text that has no file behind it
    pub fn from_source(source: &str) -> EditResult<Self> {
        Self::parse(source, None)
    }

    #[instrument(skip(source), fields(bytes = source.len()))]
    fn parse(source: &str, path: Option<PathBuf>) -> EditResult<Self> {
        let tree = parse(source)?;
        let id = match &path {
            Some(path) => get_module_id(&path.to_string_lossy()),
            None => get_module_id("<inline>"),
        };
        debug!(
            module = %id,
            statements = tree.statements().len(),
            nodes = tree.len(),
            "parsed module"
        );

        Ok(Self {
            tree: Rc::new(RefCell::new(tree)),
            path,
            id,
        })
    }

    /// Live view of the export declarations
    pub fn exports(&self) -> ExportsView {
        let root = self.tree.borrow().root();
        ExportsView {
            binding: ViewBinding::bound(self.tree.clone(), root),
        }
    }

    /// Import declarations in source order
    pub fn imports(&self) -> Vec<ImportDeclaration> {
        let tree = self.tree.borrow();
        tree.statements()
            .iter()
            .filter_map(|statement| match tree.kind(*statement) {
                Some(NodeKind::Import { source, specifiers }) => Some(ImportDeclaration {
                    source: source.clone(),
                    specifiers: specifiers.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Generate code, detecting formatting for fresh nodes from the source
    pub fn generate(&self) -> EditResult<Generated> {
        self.generate_with(&GenerateOptions::default())
    }

    #[instrument(skip(self, options), fields(module = %self.id))]
    pub fn generate_with(&self, options: &GenerateOptions) -> EditResult<Generated> {
        let tree = self.tree.borrow();
        let print_options = options.resolve(&tree.hints);
        let code = LosslessSerializer::new(&print_options).serialize(&tree)?;
        debug!(dirty = tree.changes().len(), bytes = code.len(), "generated code");
        Ok(Generated { code })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether any node was changed since parsing
    pub fn is_modified(&self) -> bool {
        !self.tree.borrow().changes().is_empty()
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }
}

/// Live view over a module's exports, keyed by export name
///
/// `default` addresses `export default …`; other names address
/// `export const|let|var` declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportsView {
    binding: ViewBinding,
}

impl ExportsView {
    pub fn get(&self, name: &str) -> Value {
        self.binding
            .read(|tree, _, shared| {
                find_export(tree, name)
                    .and_then(|statement| export_value(tree, statement))
                    .map(|value| decode(shared, value))
            })
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    /// Replace an export's value in place, or append a new export
    pub fn set(&self, name: &str, value: impl Into<Input>) -> EditResult<()> {
        validate_export_name(name)?;
        let input = value.into();
        prepare([&input])?;

        self.binding.mutate(|tree, root, shared| {
            let value = NodeFactory::new(tree, shared, root).build(&input)?;
            put_export(tree, root, name, value)?;
            debug!(export = name, "set export");
            Ok(())
        })
    }

    /// Remove the whole export statement
    pub fn delete(&self, name: &str) -> EditResult<bool> {
        self.binding.mutate(|tree, root, _| {
            let Some(statement) = find_export(tree, name) else {
                return Ok(false);
            };
            if let Some(NodeKind::Program { body }) = tree.kind_mut(root) {
                body.retain(|id| *id != statement);
            }
            detach(tree, statement);
            mark(tree, root);
            debug!(export = name, "deleted export");
            Ok(true)
        })
    }

    /// Export names in source order
    pub fn keys(&self) -> Vec<String> {
        self.binding
            .read(|tree, _, _| {
                tree.statements()
                    .iter()
                    .filter_map(|statement| export_name(tree, *statement))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.keys().iter().any(|key| key == name)
    }

    /// Object exported as `name`, created on first write if missing
    pub fn object_entry(&self, name: &str) -> EditResult<ObjectView> {
        validate_export_name(name)?;
        match self.get(name) {
            Value::Object(view) => Ok(view),
            Value::Undefined => Ok(ObjectView::new(ViewBinding::pending(
                self.binding.clone(),
                Key::from(name),
                Shape::Object,
            ))),
            other => Err(EditorError::TypeMismatch {
                key: name.to_string(),
                expected: "object",
                found: other.type_name(),
            }),
        }
    }

    /// Array exported as `name`, created on first write if missing
    pub fn array_entry(&self, name: &str) -> EditResult<ArrayView> {
        validate_export_name(name)?;
        match self.get(name) {
            Value::Array(view) => Ok(view),
            Value::Undefined => Ok(ArrayView::new(ViewBinding::pending(
                self.binding.clone(),
                Key::from(name),
                Shape::Array,
            ))),
            other => Err(EditorError::TypeMismatch {
                key: name.to_string(),
                expected: "array",
                found: other.type_name(),
            }),
        }
    }
}

impl View for ExportsView {
    fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Object
    }

    fn get(&self, key: &Key) -> Value {
        ExportsView::get(self, &key.to_name())
    }

    fn set(&self, key: &Key, value: Input) -> EditResult<()> {
        ExportsView::set(self, &key.to_name(), value)
    }

    fn delete(&self, key: &Key) -> EditResult<bool> {
        ExportsView::delete(self, &key.to_name())
    }

    fn keys(&self) -> Vec<Key> {
        ExportsView::keys(self).into_iter().map(Key::Name).collect()
    }
}

fn validate_export_name(name: &str) -> EditResult<()> {
    if name == "default" || (is_identifier(name) && !RESERVED.contains(&name)) {
        Ok(())
    } else {
        Err(EditorError::InvalidExportName(name.to_string()))
    }
}

fn export_name(tree: &Tree, statement: NodeId) -> Option<String> {
    match tree.kind(statement)? {
        NodeKind::ExportDefault { .. } => Some("default".to_string()),
        NodeKind::Declaration {
            exported: true,
            name,
            ..
        } => Some(name.clone()),
        _ => None,
    }
}

/// Statement exporting `name`
pub(crate) fn find_export(tree: &Tree, name: &str) -> Option<NodeId> {
    tree.statements()
        .iter()
        .copied()
        .find(|statement| export_name(tree, *statement).as_deref() == Some(name))
}

/// Expression an export statement binds
pub(crate) fn export_value(tree: &Tree, statement: NodeId) -> Option<NodeId> {
    match tree.kind(statement)? {
        NodeKind::ExportDefault { value } | NodeKind::Declaration { value, .. } => Some(*value),
        _ => None,
    }
}

/// Link `value` as the export `name`, replacing in place or appending
/// `export const name = value;`
pub(crate) fn put_export(tree: &mut Tree, program: NodeId, name: &str, value: NodeId) -> EditResult<()> {
    validate_export_name(name)?;

    match find_export(tree, name) {
        Some(statement) => {
            let previous = match tree.kind_mut(statement) {
                Some(NodeKind::ExportDefault { value: slot })
                | Some(NodeKind::Declaration { value: slot, .. }) => Some(std::mem::replace(slot, value)),
                _ => None,
            };
            if let Some(previous) = previous {
                detach(tree, previous);
            }
            tree.set_parent(value, Some(statement));
            mark(tree, statement);
        }
        None => {
            let kind = if name == "default" {
                NodeKind::ExportDefault { value }
            } else {
                NodeKind::Declaration {
                    exported: true,
                    kind: DeclarationKind::Const,
                    name: name.to_string(),
                    value,
                }
            };
            let statement = tree.alloc(kind, None);
            tree.set_parent(value, Some(statement));
            tree.set_parent(statement, Some(program));
            if let Some(NodeKind::Program { body }) = tree.kind_mut(program) {
                body.push(statement);
            }
            mark(tree, program);
        }
    }
    Ok(())
}

/// Parse source text into a module
pub fn parse_module(source: &str) -> EditResult<Module> {
    Module::from_source(source)
}

/// Generate code for a module with detected formatting
pub fn generate_code(module: &Module) -> EditResult<Generated> {
    module.generate()
}

/// Read and parse a module from disk
pub fn load_file(path: impl AsRef<Path>) -> EditResult<Module> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;

    Module::parse(&source, Some(path.to_path_buf())).map_err(|error| {
        if let EditorError::Parse(parse_error) = &error {
            let filename = path.to_string_lossy();
            warn!(
                "{}",
                format_errors(&source, &filename, std::slice::from_ref(parse_error))
            );
        }
        error
    })
}

/// Generate a module and write the code to `path`
pub fn write_file(module: &Module, path: impl AsRef<Path>) -> EditResult<()> {
    let generated = module.generate()?;
    std::fs::write(path.as_ref(), &generated.code)?;
    debug!(module = %module.id(), path = %path.as_ref().display(), "wrote module");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exports_keys_and_values() {
        let module = Module::from_source(
            "import { defineConfig } from 'vite'\nconst local = 1\nexport const a = 1\nexport default { b: 2 }\n",
        )
        .unwrap();
        let exports = module.exports();

        assert_eq!(exports.keys(), vec!["a", "default"]);
        assert_eq!(exports.get("a"), Value::Number(1.0));
        assert_eq!(exports.get("local"), Value::Undefined);
        assert_eq!(exports.get("default").type_name(), "object");
        assert!(!module.is_modified());
    }

    #[test]
    fn test_set_new_and_existing_exports() {
        let module = Module::from_source("export const a = 1;\n").unwrap();
        let exports = module.exports();

        exports.set("a", 2).unwrap();
        exports.set("b", json!({ "c": true })).unwrap();
        exports.set("default", json!([1])).unwrap();

        assert!(module.is_modified());
        assert_eq!(
            module.generate().unwrap().code,
            "export const a = 2;\nexport const b = {\n  c: true\n};\nexport default [1];\n"
        );
    }

    #[test]
    fn test_delete_export_statement() {
        let module = Module::from_source("// head\nexport const a = 1\n\nexport const b = 2\n").unwrap();

        assert!(module.exports().delete("a").unwrap());
        assert!(!module.exports().delete("zzz").unwrap());
        assert_eq!(module.generate().unwrap().code, "// head\nexport const b = 2\n");
    }

    #[test]
    fn test_invalid_export_names() {
        let module = Module::from_source("").unwrap();

        assert!(matches!(
            module.exports().set("not valid", 1),
            Err(EditorError::InvalidExportName(_))
        ));
        assert!(module.exports().set("const", 1).is_err());
        assert!(module.exports().object_entry("1x").is_err());
    }

    #[test]
    fn test_lazy_export_entry() {
        let module = Module::from_source("").unwrap();
        let plugins = module.exports().array_entry("plugins").unwrap();
        assert_eq!(module.exports().keys(), Vec::<String>::new());

        plugins.push(vec!["a"]).unwrap();
        assert_eq!(module.generate().unwrap().code, "export const plugins = [\"a\"];\n");
    }

    #[test]
    fn test_imports_are_listed() {
        let module = Module::from_source("import a, { b as c } from 'x'\nimport 'side'\n").unwrap();
        let imports = module.imports();

        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].source, "x");
        assert_eq!(imports[0].specifiers[1].imported, "b");
        assert_eq!(imports[0].specifiers[1].local, "c");
        assert!(imports[1].specifiers.is_empty());
    }
}
