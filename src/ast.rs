//! Declarations handed over by the Swift parser.
//!
//! One [`SourceFile`] per Swift file. Nested declarations are kept as the
//! parser reports them and flattened on demand into dotted names
//! (`Outer.Inner`), which is how an extension has to refer to them.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static TYPE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A node of the type grammar: `Optional<T>`, `Array<T>`, `Dictionary<K, V>`,
/// user generics, or a plain name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    pub base_name: String,
    /// Final name of a non-generic type alias target, filled in by
    /// [`crate::registry::GlobalAttrs::resolve`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Struct {
    pub base_name: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    #[serde(default)]
    pub var_decls: Vec<VarDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enum {
    pub base_name: String,
    pub raw_type_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// An existing extension, reported only by the names of the functions it
/// declares. Used to find hand-written codecs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub base_name: String,
    #[serde(default)]
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Declaration {
    Struct(Struct),
    Enum(Enum),
    Typealias(TypeAlias),
    Extension(Extension),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Name of the Swift file the declarations came from, e.g. `Models.swift`.
    pub filename: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// All declarations of a file with nesting removed and names qualified.
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub structs: Vec<Struct>,
    pub enums: Vec<Enum>,
    pub type_aliases: Vec<TypeAlias>,
    pub extensions: Vec<Extension>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Self { base_name: name.into(), alias: None, generic_arguments: Vec::new() }
    }

    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Self {
        Self { base_name: name.into(), alias: None, generic_arguments: args }
    }

    pub fn optional(inner: Type) -> Self {
        Self::generic("Optional", vec![inner])
    }

    pub fn array(element: Type) -> Self {
        Self::generic("Array", vec![element])
    }

    pub fn dictionary(key: Type, value: Type) -> Self {
        Self::generic("Dictionary", vec![key, value])
    }

    /// The alias target if there is one, else the base name.
    pub fn resolved_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.base_name)
    }

    fn validate(&self) -> Result<()> {
        check_name(&TYPE_NAME, "type name", &self.base_name)?;
        self.shape()?;
        self.generic_arguments.iter().try_for_each(Type::validate)
    }
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

impl Struct {
    pub fn new(name: impl Into<String>, type_arguments: &[&str], var_decls: Vec<VarDecl>) -> Self {
        Self {
            base_name: name.into(),
            type_arguments: type_arguments.iter().map(|t| t.to_string()).collect(),
            var_decls,
            nested: Vec::new(),
        }
    }
}

impl Enum {
    pub fn new(name: impl Into<String>, raw_type_name: impl Into<String>) -> Self {
        Self { base_name: name.into(), raw_type_name: raw_type_name.into(), nested: Vec::new() }
    }
}

impl SourceFile {
    pub fn flatten(&self) -> Flattened {
        let mut out = Flattened::default();
        flatten_into(&self.declarations, None, &mut out);
        out
    }

    /// Checks what the generator relies on: identifiers are identifiers,
    /// sugar types have the right arity, type names are unique in the file.
    pub fn validate(&self) -> Result<()> {
        let flat = self.flatten();
        let mut seen = BTreeSet::new();
        let names = flat
            .structs
            .iter()
            .map(|s| &s.base_name)
            .chain(flat.enums.iter().map(|e| &e.base_name));
        for name in names {
            check_name(&TYPE_NAME, "type name", name)?;
            if !seen.insert(name.clone()) {
                return Err(GenError::DuplicateDeclaration(name.clone()));
            }
        }
        for s in &flat.structs {
            for t in &s.type_arguments {
                check_name(&IDENTIFIER, "type argument", t)?;
            }
            for decl in &s.var_decls {
                check_name(&IDENTIFIER, "field name", &decl.name)?;
                decl.ty.validate()?;
            }
        }
        for e in &flat.enums {
            check_name(&TYPE_NAME, "raw type", &e.raw_type_name)?;
        }
        for alias in &flat.type_aliases {
            check_name(&TYPE_NAME, "type alias", &alias.name)?;
            alias.ty.validate()?;
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn qualify(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(outer) => format!("{outer}.{name}"),
        None => name.to_string(),
    }
}

fn flatten_into(decls: &[Declaration], scope: Option<&str>, out: &mut Flattened) {
    for decl in decls {
        match decl {
            Declaration::Struct(s) => {
                let name = qualify(scope, &s.base_name);
                out.structs.push(Struct {
                    base_name: name.clone(),
                    type_arguments: s.type_arguments.clone(),
                    var_decls: s.var_decls.clone(),
                    nested: Vec::new(),
                });
                flatten_into(&s.nested, Some(&name), out);
            }
            Declaration::Enum(e) => {
                let name = qualify(scope, &e.base_name);
                out.enums.push(Enum {
                    base_name: name.clone(),
                    raw_type_name: e.raw_type_name.clone(),
                    nested: Vec::new(),
                });
                flatten_into(&e.nested, Some(&name), out);
            }
            Declaration::Typealias(a) => out.type_aliases.push(TypeAlias {
                name: qualify(scope, &a.name),
                ty: a.ty.clone(),
            }),
            Declaration::Extension(x) => out.extensions.push(Extension {
                base_name: qualify(scope, &x.base_name),
                functions: x.functions.clone(),
            }),
        }
    }
}

fn check_name(pattern: &Regex, what: &'static str, name: &str) -> Result<()> {
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(GenError::InvalidIdentifier { what, name: name.to_string() })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
