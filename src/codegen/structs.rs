//! `decodeJson` / `encodeJson` for structs.
//!
//! A generic struct `Box<T>` cannot know how to handle `T`, so both functions
//! take one function per type argument:
//!
//! ```text
//! static func decodeJson(decodeT: AnyObject -> T?, _ json: AnyObject) -> Box?
//! func encodeJson(encodeT: T -> AnyObject) -> [String: AnyObject]
//! ```

use super::Warning;
use super::field::{DecodeFailure, emit_field_decode, emit_field_encode, guard};
use crate::ast::{Enum, Struct};
use crate::error::Result;

const BODY_INDENT: usize = 4;

pub fn make_struct_decoder(s: &Struct) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    lines.push(format!("  static func decodeJson{} -> {}? {{", decode_arguments(s), s.base_name));

    let mut body = Vec::new();
    guard(
        &mut body,
        "dict = json as? [String : AnyObject]",
        &DecodeFailure::TypeMismatch { field: None, expected: "dictionary".to_string() },
    );
    body.push(String::new());
    for decl in &s.var_decls {
        body.extend(emit_field_decode(decl, &s.type_arguments)?);
    }
    body.push(make_return(s));

    lines.extend(body.iter().map(|line| indent(BODY_INDENT, line)));
    lines.push("  }".to_string());

    Ok(lines)
}

/// The encoder, and a warning for every field annotated with
/// [`super::field::NON_STRING_KEY_WARNING`].
pub fn make_struct_encoder(s: &Struct, enums: &[Enum]) -> Result<(Vec<String>, Vec<Warning>)> {
    let mut lines = Vec::new();
    let mut warnings = Vec::new();

    lines.push(format!("  func encodeJson{} -> [String: AnyObject] {{", encode_arguments(s)));

    let mut body = vec!["var dict: [String: AnyObject] = [:]".to_string(), String::new()];
    for decl in &s.var_decls {
        let encoded = emit_field_encode(decl, &s.type_arguments, enums)?;
        if let Some(key) = encoded.non_string_key {
            warnings.push(Warning {
                type_name: s.base_name.clone(),
                field: decl.name.clone(),
                key,
            });
        }
        body.extend(encoded.lines);
    }
    body.push(String::new());
    body.push("return dict".to_string());

    lines.extend(body.iter().map(|line| indent(BODY_INDENT, line)));
    lines.push("  }".to_string());

    Ok((lines, warnings))
}

/// `(decodeT: AnyObject -> T?, _ json: AnyObject)`
fn decode_arguments(s: &Struct) -> String {
    let mut parts = s
        .type_arguments
        .iter()
        .map(|t| format!("decode{t}: AnyObject -> {t}?"))
        .collect::<Vec<_>>();
    parts.push("json: AnyObject".to_string());
    argument_list(parts)
}

/// `(encodeT: T -> AnyObject, _ encodeU: U -> AnyObject)`
fn encode_arguments(s: &Struct) -> String {
    let parts = s
        .type_arguments
        .iter()
        .map(|t| format!("encode{t}: {t} -> AnyObject"))
        .collect::<Vec<_>>();
    argument_list(parts)
}

/// Only the first parameter keeps its external label.
fn argument_list(parts: Vec<String>) -> String {
    let parts = parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| if i == 0 { part } else { format!("_ {part}") })
        .collect::<Vec<_>>();
    format!("({})", parts.join(", "))
}

fn make_return(s: &Struct) -> String {
    let params = s
        .var_decls
        .iter()
        .map(|decl| format!("{0}: {0}", decl.name))
        .collect::<Vec<_>>();
    format!("return {}({})", s.base_name, params.join(", "))
}

fn indent(width: usize, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{line}", " ".repeat(width))
    }
}

// ------------------------------- Tests ------------------------------------ //
