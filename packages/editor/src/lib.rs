//! # Castwork Editor
//!
//! Edit ECMAScript config modules through live views while keeping the
//! original text wherever nothing changed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → Tree (spans, comments)│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Module + views                      │
//! │  - Object/Array/Call views over tree nodes  │
//! │  - Inputs materialized by the NodeFactory   │
//! │  - Writes mark the mutated node dirty       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: LosslessSerializer stitches output  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: views hold node ids, never copies
//! 2. **Minimal diff**: only dirty nodes and fresh nodes are reprinted
//! 3. **Shared by reference**: assigning a view links the same node
//!
//! ## Usage
//!
//! ```rust,ignore
//! use castwork_editor::{load_file, write_file, Input, Value};
//!
//! let module = load_file("vite.config.ts")?;
//!
//! if let Value::Call(config) = module.exports().get("default") {
//!     let options = config.argument(0);
//!     let options = options.as_object().unwrap();
//!     options.array_entry("plugins")?.push([Input::identifier("vue")])?;
//!     options.object_entry("server")?.set("port", 3000)?;
//! }
//!
//! write_file(&module, "vite.config.ts")?;
//! ```

mod array;
mod binding;
mod call;
mod errors;
mod factory;
mod module;
mod object;
mod options;
mod value;
mod view;

pub use array::{ArrayView, Iter, MAX_HOLE_PADDING};
pub use binding::ViewBinding;
pub use call::CallView;
pub use errors::{EditResult, EditorError};
pub use module::{
    generate_code, load_file, parse_module, write_file, ExportsView, Generated, ImportDeclaration, Module,
};
pub use object::ObjectView;
pub use options::GenerateOptions;
pub use value::{Input, Key, Value};
pub use view::{View, ViewKind};

pub use castwork_parser::{ParseError, QuoteStyle};
