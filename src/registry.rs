//! What already exists across all input files: hand-written codecs and type
//! aliases.
//!
//! Built once per run, before any file is generated, and shared read-only by
//! every generation task.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{Enum, SourceFile, Struct, Type, VarDecl};
use crate::codegen::planner::{DECODE_FN, ENCODE_FN};
use crate::codegen::shape::Marker;
use crate::error::{GenError, Result};

/// Read-only view of existing codecs, by type name.
pub trait CodecRegistry {
    fn has_decoder(&self, type_name: &str) -> bool;
    fn has_encoder(&self, type_name: &str) -> bool;
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAttrs {
    pub decoders: BTreeSet<String>,
    pub encoders: BTreeSet<String>,
    pub type_aliases: IndexMap<String, Type>,
    /// Every enum of every input, by qualified name, with its raw type as
    /// written.
    pub enums: IndexMap<String, String>,
}

impl CodecRegistry for GlobalAttrs {
    fn has_decoder(&self, type_name: &str) -> bool {
        self.decoders.contains(type_name)
    }

    fn has_encoder(&self, type_name: &str) -> bool {
        self.encoders.contains(type_name)
    }
}

impl GlobalAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceFile>,
    {
        let mut attrs = Self::new();
        for file in files {
            attrs.observe_file(file);
        }
        attrs
    }

    pub fn observe_file(&mut self, file: &SourceFile) {
        let flat = file.flatten();
        for ext in flat.extensions {
            if ext.functions.iter().any(|f| f == DECODE_FN) {
                self.decoders.insert(ext.base_name.clone());
            }
            if ext.functions.iter().any(|f| f == ENCODE_FN) {
                self.encoders.insert(ext.base_name);
            }
        }
        for alias in flat.type_aliases {
            self.type_aliases.insert(alias.name, alias.ty);
        }
        for en in flat.enums {
            self.enums.insert(en.base_name, en.raw_type_name);
        }
    }

    /// Rewrites every alias in `ty`, including inside generic arguments.
    ///
    /// Chains are followed to their end. A non-generic target is recorded in
    /// [`Type::alias`] and the written name kept; a generic target replaces
    /// the type. Marker names are never looked up.
    pub fn resolve(&self, ty: &Type) -> Result<Type> {
        self.resolve_in(ty, &[], &mut Vec::new())
    }

    /// Resolves every field type. The struct's own type arguments shadow
    /// aliases of the same name.
    pub fn resolve_struct(&self, s: &Struct) -> Result<Struct> {
        let var_decls = s
            .var_decls
            .iter()
            .map(|decl| {
                let ty = self.resolve_in(&decl.ty, &s.type_arguments, &mut Vec::new())?;
                Ok(VarDecl::new(decl.name.clone(), ty))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Struct { var_decls, ..s.clone() })
    }

    /// The enum with its raw type resolved to a final name, so an enum backed
    /// by `typealias Key = String` counts as string-backed.
    pub fn resolve_enum(&self, en: &Enum) -> Result<Enum> {
        let raw = self.resolve(&Type::named(en.raw_type_name.as_str()))?;
        Ok(Enum::new(en.base_name.as_str(), raw.resolved_name()))
    }

    /// Enums a dictionary key may name: `local` first, then those of the
    /// other inputs. Raw types are resolved.
    pub fn known_enums(&self, local: &[Enum]) -> Result<Vec<Enum>> {
        let others = self
            .enums
            .iter()
            .filter(|(name, _)| !local.iter().any(|en| &en.base_name == *name))
            .map(|(name, raw)| Enum::new(name.as_str(), raw.as_str()));
        local
            .iter()
            .cloned()
            .chain(others)
            .map(|en| self.resolve_enum(&en))
            .collect()
    }

    fn resolve_in(&self, ty: &Type, params: &[String], chain: &mut Vec<String>) -> Result<Type> {
        let depth = chain.len();
        let mut target = ty;
        let shadowed = ty.generic_arguments.is_empty() && params.contains(&ty.base_name);
        while !shadowed
            && target.generic_arguments.is_empty()
            && Marker::named(&target.base_name).is_none()
        {
            let Some(next) = self.type_aliases.get(&target.base_name) else {
                break;
            };
            if chain.contains(&target.base_name) {
                return Err(GenError::AliasCycle(target.base_name.clone()));
            }
            chain.push(target.base_name.clone());
            target = next;
        }

        let resolved = if std::ptr::eq(target, ty) {
            Type {
                base_name: ty.base_name.clone(),
                alias: ty.alias.clone(),
                generic_arguments: self.resolve_args(ty, params, chain)?,
            }
        } else if target.generic_arguments.is_empty() {
            Type {
                base_name: ty.base_name.clone(),
                alias: Some(target.base_name.clone()),
                generic_arguments: Vec::new(),
            }
        } else {
            Type {
                base_name: target.base_name.clone(),
                alias: None,
                // the alias was declared outside the struct
                generic_arguments: self.resolve_args(target, &[], chain)?,
            }
        };

        chain.truncate(depth);
        Ok(resolved)
    }

    fn resolve_args(&self, ty: &Type, params: &[String], chain: &mut Vec<String>) -> Result<Vec<Type>> {
        ty.generic_arguments
            .iter()
            .map(|arg| self.resolve_in(arg, params, chain))
            .collect()
    }
}

// ------------------------------- Tests ------------------------------------ //
