//! Error types for the editor

use thiserror::Error;

pub type EditResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] castwork_parser::ParseError),

    #[error("Print error: {0}")]
    Print(#[from] castwork_parser::PrintError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("Unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    #[error("Assigning this value would make a node contain itself")]
    CyclicReference,

    #[error("Expected {expected} at '{key}', found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{kind} views are read-only")]
    ReadOnlyView { kind: &'static str },

    #[error("'{0}' is not a valid export name")]
    InvalidExportName(String),

    #[error("View is not attached to a location that can be materialized")]
    Detached,
}
