//! Generates Swift JSON codecs (`decodeJson` / `encodeJson` extensions) from
//! parsed Swift struct and enum declarations.
pub mod ast;
pub mod cli;
pub mod codegen;
pub mod error;
pub mod jq_exec;
pub mod path_de;
pub mod registry;
pub mod runtime;

pub use error::{GenError, Result};
