//! Per-field statements inside a struct's `decodeJson` / `encodeJson`.
//!
//! The generated decoder reads fields from `dict` in declaration order. Each
//! required field is a `guard` that returns `nil` on failure, so the first
//! missing or mismatched field ends the whole decode.

use std::fmt;

use super::planner::{decode_expr, encode_expr};
use super::shape::{Marker, Shape, spell};
use crate::ast::{Enum, Type, VarDecl};
use crate::error::{GenError, Result};

pub(crate) const NON_STRING_KEY_WARNING: &str =
    "/* WARNING: Json only supports Strings as keys in dictionaries */";

/// Why generated decoding gives up, rendered into its `assertionFailure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure<'a> {
    MissingField { field: &'a str },
    /// `field: None` means the input as a whole had the wrong shape.
    TypeMismatch { field: Option<&'a str>, expected: String },
}

impl fmt::Display for DecodeFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::MissingField { field } => write!(f, "field '{field}' is missing"),
            DecodeFailure::TypeMismatch { field: Some(field), expected } => {
                write!(f, "field '{field}' is not a {expected}")
            }
            DecodeFailure::TypeMismatch { field: None, expected } => {
                write!(f, "json not a {expected}")
            }
        }
    }
}

/// `guard let <binding> else { assertionFailure(..); return nil }`
pub(crate) fn guard(lines: &mut Vec<String>, binding: &str, failure: &DecodeFailure<'_>) {
    lines.push(format!("guard let {binding} else {{"));
    lines.push(format!("  assertionFailure(\"{failure}\")"));
    lines.push("  return nil".to_string());
    lines.push("}".to_string());
}

pub fn emit_field_decode(field: &VarDecl, generic_names: &[String]) -> Result<Vec<String>> {
    let name = field.name.as_str();
    let ty = &field.ty;
    let raw = format!("{name}_field");
    let type_string = spell(ty);

    let mut lines = Vec::new();

    match ty.shape()? {
        Shape::Optional(inner) => {
            lines.push(format!("let {raw}: AnyObject? = dict[\"{name}\"]"));
            lines.push(format!(
                "let {name}: {type_string} = {raw} == nil || {raw}! is NSNull ? nil : {}",
                decode_expr(&format!("{raw}!"), inner, generic_names)
            ));
        }
        Shape::Plain | Shape::Array(_) | Shape::Dictionary(..) | Shape::Generic(_) => {
            guard(
                &mut lines,
                &format!("{raw}: AnyObject = dict[\"{name}\"]"),
                &DecodeFailure::MissingField { field: name },
            );
            let mismatch = DecodeFailure::TypeMismatch {
                field: Some(name),
                expected: type_string.clone(),
            };
            match Marker::of(ty) {
                Some(Marker::PassThrough) => {
                    lines.push(format!("let {name}: {type_string} = {raw}"));
                }
                Some(Marker::Cast) => guard(
                    &mut lines,
                    &format!("{name}: {type_string} = {raw} as? {type_string}"),
                    &mismatch,
                ),
                None => guard(
                    &mut lines,
                    &format!("{name}: {type_string} = {}", decode_expr(&raw, ty, generic_names)),
                    &mismatch,
                ),
            }
        }
    }

    lines.push(String::new());

    Ok(lines)
}

/// The statements encoding one field, and the dictionary key they were
/// annotated for, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEncode {
    pub lines: Vec<String>,
    pub non_string_key: Option<String>,
}

pub fn emit_field_encode(
    field: &VarDecl,
    generic_names: &[String],
    known_enums: &[Enum],
) -> Result<FieldEncode> {
    let mut lines = Vec::new();

    let key = non_string_key(field, known_enums)?.map(|key| key.resolved_name().to_string());
    if key.is_some() {
        lines.push(NON_STRING_KEY_WARNING.to_string());
    }
    lines.push(format!(
        "dict[\"{}\"] = {}",
        field.name,
        encode_expr(&field.name, &field.ty, generic_names)
    ));

    Ok(FieldEncode { lines, non_string_key: key })
}

/// For a dictionary field keyed by an enum with a non-`String` raw type,
/// the key type. JSON objects only have string keys, so the encoded output
/// will be wrong; this is reported but does not stop generation.
///
/// A non-`String` key that is not one of `known_enums` cannot be judged at
/// all and is an error.
fn non_string_key<'a>(field: &'a VarDecl, known_enums: &[Enum]) -> Result<Option<&'a Type>> {
    let Shape::Dictionary(key, _) = field.ty.shape()? else {
        return Ok(None);
    };
    let key_name = key.resolved_name();
    if is_string_like(key_name) {
        return Ok(None);
    }
    let key_enum = known_enums
        .iter()
        .find(|e| e.base_name == key_name)
        .ok_or_else(|| GenError::UnsupportedDictionaryKey {
            field: field.name.clone(),
            key: key_name.to_string(),
        })?;
    if is_string_like(&key_enum.raw_type_name) {
        Ok(None)
    } else {
        Ok(Some(key))
    }
}

fn is_string_like(name: &str) -> bool {
    name == "String"
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Type {
        Type::named(name)
    }

    fn t() -> Vec<String> {
        vec!["T".to_string()]
    }

    #[test]
    fn required_field_guards_presence_then_decodes() {
        let lines = emit_field_decode(&VarDecl::new("x", named("Int")), &[]).unwrap();
        assert_eq!(lines, [
            "guard let x_field: AnyObject = dict[\"x\"] else {",
            "  assertionFailure(\"field 'x' is missing\")",
            "  return nil",
            "}",
            "guard let x: Int = Int.decodeJson(x_field) else {",
            "  assertionFailure(\"field 'x' is not a Int\")",
            "  return nil",
            "}",
            "",
        ]);
    }

    #[test]
    fn optional_field_is_nil_when_absent_or_null() {
        let field = VarDecl::new("value", Type::optional(named("T")));
        let lines = emit_field_decode(&field, &t()).unwrap();
        assert_eq!(lines, [
            "let value_field: AnyObject? = dict[\"value\"]",
            "let value: T? = value_field == nil || value_field! is NSNull ? nil : decodeT(value_field!)",
            "",
        ]);
    }

    #[test]
    fn pass_through_field_binds_raw_value() {
        let lines = emit_field_decode(&VarDecl::new("extra", named("AnyJson")), &[]).unwrap();
        assert_eq!(lines[4], "let extra: AnyJson = extra_field");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn cast_field_guards_the_cast() {
        let lines = emit_field_decode(&VarDecl::new("meta", named("JsonObject")), &[]).unwrap();
        assert_eq!(lines[4], "guard let meta: JsonObject = meta_field as? JsonObject else {");
        assert_eq!(lines[5], "  assertionFailure(\"field 'meta' is not a JsonObject\")");
    }

    #[test]
    fn array_field_spells_its_type() {
        let field = VarDecl::new("tags", Type::array(named("String")));
        let lines = emit_field_decode(&field, &[]).unwrap();
        assert_eq!(
            lines[4],
            "guard let tags: [String] = Array.decodeJson({ String.decodeJson($0) }, tags_field) else {"
        );
    }

    #[test]
    fn encode_assigns_into_dict() {
        let encoded = emit_field_encode(&VarDecl::new("value", named("T")), &t(), &[]).unwrap();
        assert_eq!(encoded.lines, ["dict[\"value\"] = encodeT(value)"]);
        assert_eq!(encoded.non_string_key, None);
    }

    #[test]
    fn string_keys_need_no_warning() {
        let enums = [Enum::new("Color", "String")];
        for key in ["String", "Color"] {
            let field = VarDecl::new("m", Type::dictionary(named(key), named("Int")));
            let encoded = emit_field_encode(&field, &[], &enums).unwrap();
            assert_eq!(encoded.lines.len(), 1, "key {key}");
        }
    }

    #[test]
    fn int_backed_enum_key_is_annotated() {
        let enums = [Enum::new("Level", "Int")];
        let field = VarDecl::new("counts", Type::dictionary(named("Level"), named("Int")));
        let encoded = emit_field_encode(&field, &[], &enums).unwrap();
        assert_eq!(encoded.lines, [
            NON_STRING_KEY_WARNING,
            "dict[\"counts\"] = counts.encodeJson({ $0.encodeJson() }, { $0.encodeJson() })",
        ]);
        assert_eq!(encoded.non_string_key.as_deref(), Some("Level"));
    }

    #[test]
    fn unknown_non_string_key_fails_cleanly() {
        let field = VarDecl::new("byId", Type::dictionary(named("Int"), named("String")));
        assert_eq!(
            emit_field_encode(&field, &[], &[]),
            Err(GenError::UnsupportedDictionaryKey { field: "byId".into(), key: "Int".into() })
        );
    }

    #[test]
    fn failure_messages() {
        let whole = DecodeFailure::TypeMismatch { field: None, expected: "dictionary".into() };
        assert_eq!(whole.to_string(), "json not a dictionary");
    }
}
