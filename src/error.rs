//! Generation-time failures.
//!
//! These only arise from declarations the parser should never hand over
//! (wrong arity, bad identifiers, alias cycles) or from dictionary keys that
//! cannot be represented in JSON. Decode failures in the *generated* code are
//! a different thing, see [`crate::codegen::field::DecodeFailure`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("`{name}` takes {expected} generic argument(s), found {found}")]
    MalformedType {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "field `{field}` is keyed by `{key}`, which is neither String nor an enum declared in this file"
    )]
    UnsupportedDictionaryKey { field: String, key: String },

    #[error("type alias `{0}` refers to itself")]
    AliasCycle(String),

    #[error("invalid {what} `{name}`")]
    InvalidIdentifier { what: &'static str, name: String },

    #[error("`{0}` is declared more than once")]
    DuplicateDeclaration(String),
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
