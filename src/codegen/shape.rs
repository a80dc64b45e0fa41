//! Type shapes and their Swift spelling.

use crate::ast::Type;
use crate::error::{GenError, Result};

/// What a [`Type`] looks like to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    Plain,
    Optional(&'a Type),
    Array(&'a Type),
    Dictionary(&'a Type, &'a Type),
    Generic(&'a [Type]),
}

/// Types that are already JSON and need no codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `AnyObject`, `AnyJson`: used as is.
    PassThrough,
    /// `JsonObject`, `JsonArray`: raw containers, reached with `as?`.
    Cast,
}

impl Type {
    pub fn shape(&self) -> Result<Shape<'_>> {
        let args = self.generic_arguments.as_slice();
        match (self.base_name.as_str(), args) {
            ("Optional", [inner]) => Ok(Shape::Optional(inner)),
            ("Array", [element]) => Ok(Shape::Array(element)),
            ("Dictionary", [key, value]) => Ok(Shape::Dictionary(key, value)),
            ("Optional" | "Array", _) => Err(self.malformed(1)),
            ("Dictionary", _) => Err(self.malformed(2)),
            (_, []) => Ok(Shape::Plain),
            (_, args) => Ok(Shape::Generic(args)),
        }
    }

    fn malformed(&self, expected: usize) -> GenError {
        GenError::MalformedType {
            name: self.base_name.clone(),
            expected,
            found: self.generic_arguments.len(),
        }
    }
}

impl Marker {
    const PASS_THROUGH: [&'static str; 2] = ["AnyObject", "AnyJson"];
    const CAST: [&'static str; 2] = ["JsonObject", "JsonArray"];

    pub fn named(name: &str) -> Option<Self> {
        if Self::PASS_THROUGH.contains(&name) {
            Some(Marker::PassThrough)
        } else if Self::CAST.contains(&name) {
            Some(Marker::Cast)
        } else {
            None
        }
    }

    /// Checks the alias and the base name; pass-through wins over cast.
    pub fn of(ty: &Type) -> Option<Self> {
        let names = [ty.alias.as_deref(), Some(ty.base_name.as_str())];
        [Marker::PassThrough, Marker::Cast].into_iter().find(|marker| {
            names.iter().flatten().any(|name| Marker::named(name) == Some(*marker))
        })
    }
}

/// Swift spelling of a type, with `?`, `[T]` and `[K:V]` sugar.
pub fn spell(ty: &Type) -> String {
    match ty.shape() {
        Ok(Shape::Plain) => ty.base_name.clone(),
        Ok(Shape::Optional(inner)) => format!("{}?", spell(inner)),
        Ok(Shape::Array(element)) => format!("[{}]", spell(element)),
        Ok(Shape::Dictionary(key, value)) => format!("[{}:{}]", spell(key), spell(value)),
        Ok(Shape::Generic(_)) | Err(_) => spell_generic(ty),
    }
}

fn spell_generic(ty: &Type) -> String {
    if ty.generic_arguments.is_empty() {
        return ty.base_name.clone();
    }
    let args = ty.generic_arguments.iter().map(spell).collect::<Vec<_>>();
    format!("{}<{}>", ty.base_name, args.join(", "))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Type {
        Type::named(name)
    }

    #[test]
    fn plain_names_spell_verbatim() {
        for name in ["Int", "String", "Outer.Inner", "AnyJson", "Optional"] {
            assert_eq!(spell(&named(name)), name);
        }
    }

    #[test]
    fn sugar_spellings() {
        let point = named("Point");
        assert_eq!(spell(&Type::optional(point.clone())), "Point?");
        assert_eq!(spell(&Type::array(point.clone())), "[Point]");
        assert_eq!(spell(&Type::dictionary(named("String"), point.clone())), "[String:Point]");
        assert_eq!(
            spell(&Type::optional(Type::array(Type::dictionary(named("String"), Type::optional(point))))),
            "[[String:Point?]]?"
        );
    }

    #[test]
    fn user_generics_use_angle_brackets() {
        let ty = Type::generic("Pair", vec![named("Int"), Type::array(named("String"))]);
        assert_eq!(spell(&ty), "Pair<Int, [String]>");
    }

    #[test]
    fn spell_is_total_on_malformed_sugar() {
        let ty = Type::generic("Dictionary", vec![named("String")]);
        assert!(ty.shape().is_err());
        assert_eq!(spell(&ty), "Dictionary<String>");
    }

    #[test]
    fn shape_classification() {
        let opt = Type::optional(named("Int"));
        assert_eq!(opt.shape(), Ok(Shape::Optional(&named("Int"))));
        assert_eq!(named("Int").shape(), Ok(Shape::Plain));
        let pair = Type::generic("Pair", vec![named("A"), named("B")]);
        assert!(matches!(pair.shape(), Ok(Shape::Generic(args)) if args.len() == 2));
        assert_eq!(
            Type::generic("Array", vec![]).shape(),
            Err(GenError::MalformedType { name: "Array".into(), expected: 1, found: 0 })
        );
    }

    #[test]
    fn markers() {
        assert_eq!(Marker::of(&named("AnyObject")), Some(Marker::PassThrough));
        assert_eq!(Marker::of(&named("JsonArray")), Some(Marker::Cast));
        assert_eq!(Marker::of(&named("Int")), None);

        let mut aliased = named("Payload");
        aliased.alias = Some("JsonObject".into());
        assert_eq!(Marker::of(&aliased), Some(Marker::Cast));
    }
}
