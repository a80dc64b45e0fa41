//! Decode and encode expressions for a value of a given type.
//!
//! Both directions share one dispatch:
//!
//! 1. marker types are already JSON and only need a cast (or nothing);
//! 2. a struct's own generic parameter is handled by the `decodeT` /
//!    `encodeT` function the caller passes in;
//! 3. everything else calls the type's own `decodeJson` / `encodeJson`,
//!    with one closure per generic argument, built recursively.
//!
//! The recursion ends at markers or at types without generic arguments.

use std::iter;

use super::shape::Marker;
use crate::ast::Type;

pub(crate) const DECODE_FN: &str = "decodeJson";
pub(crate) const ENCODE_FN: &str = "encodeJson";

enum Codec<'a> {
    Marker(Marker, &'a str),
    GenericParam(&'a str),
    Entry(&'a str),
}

fn classify<'a>(ty: &'a Type, generic_names: &[String]) -> Codec<'a> {
    let name = ty.resolved_name();
    match Marker::of(ty) {
        Some(marker) => Codec::Marker(marker, name),
        None if generic_names.iter().any(|g| g == name) => Codec::GenericParam(name),
        None => Codec::Entry(name),
    }
}

/// Expression decoding `input` (an `AnyObject`) into an optional `ty`.
pub fn decode_expr(input: &str, ty: &Type, generic_names: &[String]) -> String {
    match classify(ty, generic_names) {
        Codec::Marker(Marker::PassThrough, name) => format!("{input} as {name}"),
        Codec::Marker(Marker::Cast, name) => format!("{input} as? {name}"),
        Codec::GenericParam(name) => {
            format!("decode{name}({})", decode_call_args(input, ty, generic_names))
        }
        Codec::Entry(name) => {
            format!("{name}.{DECODE_FN}({})", decode_call_args(input, ty, generic_names))
        }
    }
}

/// `decode_expr` over the closure argument `$0`, as passed for a generic
/// argument (`Array.decodeJson({ Int.decodeJson($0) }, json)`).
pub fn decode_arg_closure(ty: &Type, generic_names: &[String]) -> String {
    format!("{{ {} }}", decode_expr("$0", ty, generic_names))
}

/// Expression encoding the value `name` of type `ty` into JSON.
pub fn encode_expr(name: &str, ty: &Type, generic_names: &[String]) -> String {
    match classify(ty, generic_names) {
        Codec::Marker(..) => name.to_string(),
        Codec::GenericParam(param) => format!("encode{param}({name})"),
        Codec::Entry(_) => {
            let closures = ty
                .generic_arguments
                .iter()
                .map(|arg| format!("{{ {} }}", encode_expr("$0", arg, generic_names)))
                .collect::<Vec<_>>();
            format!("{name}.{ENCODE_FN}({})", closures.join(", "))
        }
    }
}

fn decode_call_args(input: &str, ty: &Type, generic_names: &[String]) -> String {
    ty.generic_arguments
        .iter()
        .map(|arg| decode_arg_closure(arg, generic_names))
        .chain(iter::once(input.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ------------------------------- Tests ------------------------------------ //
