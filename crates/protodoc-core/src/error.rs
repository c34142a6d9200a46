use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtoDocError>;

#[derive(Debug, Error)]
pub enum ProtoDocError {
    #[error("failed to decode descriptor set: {0}")]
    SchemaDecode(#[source] prost::DecodeError),

    #[error("duplicate symbol {symbol} (declared in {first_file} and {second_file})")]
    DuplicateSymbol {
        symbol: String,
        first_file: String,
        second_file: String,
    },

    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),

    #[error("unknown symbol {0}")]
    NotFound(String),

    #[error("field {field} has unsupported wire type {type_code}")]
    UnsupportedFieldType { field: String, type_code: i32 },

    #[error("invalid URI template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("{symbol} is not a {expected}")]
    WrongKind {
        symbol: String,
        expected: &'static str,
    },
}

/// A structural path that does not follow the tag grammar of the file it was
/// recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed structural path {path:?} in {file}: {reason}")]
pub struct MalformedPathError {
    pub file: String,
    pub path: Vec<i32>,
    pub reason: String,
}
