//! # Castwork Parser
//!
//! Source text ⇄ syntax tree for the ECMAScript module subset edited by
//! `castwork-editor`: a logos tokenizer, a recursive-descent parser that
//! records byte spans and comments on every node, and a printer for nodes
//! whose shape has changed. [`LosslessSerializer`] stitches both together
//! so untouched regions come back byte-for-byte.

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod lossless_serializer;
pub mod parser;
pub mod serializer;
pub mod tokenizer;
pub mod tracker;

pub use ast::{NodeId, NodeKind, SharedTree, Span, Tree};
pub use error::{format_errors, ParseError, ParseResult, PrintError, PrintResult};
pub use id_generator::get_module_id;
pub use lossless_serializer::LosslessSerializer;
pub use parser::{parse, Parser};
pub use serializer::{print, ChildText, PrintOptions, QuoteStyle, Serializer};
pub use tokenizer::{tokenize, Token};
pub use tracker::ChangeTracker;
