//! Swift codec generation: one output file per input file.
//!
//! ```text
//! SourceFile ─ resolve aliases ─► enums, structs ─► Codegen ─► lines
//!                                                     ▲
//!                                   CodecRegistry ────┘ (skip what exists)
//! ```
//!
//! Everything here is a pure function of the declarations, the registry and
//! the timestamp passed in.
pub mod enums;
pub mod field;
pub mod planner;
pub mod shape;
pub mod structs;

use chrono::{DateTime, Utc};

use crate::ast::{Enum, SourceFile, Struct};
use crate::error::Result;
use crate::registry::{CodecRegistry, GlobalAttrs};

pub use planner::{decode_arg_closure, decode_expr, encode_expr};
pub use shape::{Marker, Shape, spell};

/// A dictionary field whose encoded keys will not be strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub type_name: String,
    pub field: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub filename: String,
    pub lines: Vec<String>,
    /// Number of `extension` blocks; zero means there is nothing to write.
    pub extensions: usize,
    pub warnings: Vec<Warning>,
}

// ------------------------------- Assembler -------------------------------- //

const HOMEPAGE: &str = "https://github.com/tomlokhorst/swift-json-gen";

pub struct Codegen<'r, R: CodecRegistry + ?Sized> {
    registry: &'r R,
    lines: Vec<String>,
    extensions: usize,
    warnings: Vec<Warning>,
}

impl<'r, R: CodecRegistry + ?Sized> Codegen<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self { registry, lines: Vec::new(), extensions: 0, warnings: Vec::new() }
    }

    pub fn header(&mut self, filename: &str, generated_at: DateTime<Utc>) {
        self.lines.push("//".to_string());
        self.lines.push(format!("//  {filename}"));
        self.lines.push("//".to_string());
        self.lines.push(format!(
            "//  Auto generated by swift-json-gen on {}",
            generated_at.format("%a, %d %b %Y %H:%M:%S GMT")
        ));
        self.lines.push(format!("//  See for details: {HOMEPAGE}"));
        self.lines.push("//".to_string());
        self.lines.push(String::new());
        self.lines.push("import Foundation".to_string());
        self.lines.push(String::new());
    }

    /// Emits enums first, then structs. `known_enums` are the enums a
    /// dictionary key may name, including ones whose codecs already exist.
    pub fn emit(&mut self, enums: &[Enum], structs: &[Struct], known_enums: &[Enum]) -> Result<()> {
        for en in enums {
            let (decoder, encoder) = self.missing(&en.base_name);
            self.extension(
                &en.base_name,
                decoder.then(|| enums::make_enum_decoder(en)),
                encoder.then(|| enums::make_enum_encoder(en)),
            );
        }

        for s in structs {
            let (decoder, encoder) = self.missing(&s.base_name);
            let decoder = if decoder { Some(structs::make_struct_decoder(s)?) } else { None };
            let encoder = if encoder {
                let (lines, warnings) = structs::make_struct_encoder(s, known_enums)?;
                self.warnings.extend(warnings);
                Some(lines)
            } else {
                None
            };
            self.extension(&s.base_name, decoder, encoder);
        }

        Ok(())
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_file(self, filename: impl Into<String>) -> GeneratedFile {
        GeneratedFile {
            filename: filename.into(),
            lines: self.lines,
            extensions: self.extensions,
            warnings: self.warnings,
        }
    }

    fn missing(&self, type_name: &str) -> (bool, bool) {
        (!self.registry.has_decoder(type_name), !self.registry.has_encoder(type_name))
    }

    fn extension(&mut self, type_name: &str, decoder: Option<Vec<String>>, encoder: Option<Vec<String>>) {
        if decoder.is_none() && encoder.is_none() {
            return;
        }
        self.extensions += 1;
        self.lines.push(format!("extension {type_name} {{"));
        let both = decoder.is_some() && encoder.is_some();
        if let Some(decoder) = decoder {
            self.lines.extend(decoder);
        }
        if both {
            self.lines.push(String::new());
        }
        if let Some(encoder) = encoder {
            self.lines.extend(encoder);
        }
        self.lines.push("}".to_string());
        self.lines.push(String::new());
    }
}

// ------------------------------- Front API -------------------------------- //

/// `Models.swift` → `Models+JsonGen.swift`
pub fn output_filename(source_filename: &str) -> String {
    let stem = source_filename.strip_suffix(".swift").unwrap_or(source_filename);
    format!("{stem}+JsonGen.swift")
}

/// Generates the output for one input file against the registry scanned from
/// all inputs.
pub fn make_file(
    file: &SourceFile,
    attrs: &GlobalAttrs,
    generated_at: DateTime<Utc>,
) -> Result<GeneratedFile> {
    file.validate()?;
    let flat = file.flatten();
    let structs = flat
        .structs
        .iter()
        .map(|s| attrs.resolve_struct(s))
        .collect::<Result<Vec<_>>>()?;
    let known_enums = attrs.known_enums(&flat.enums)?;

    let filename = output_filename(&file.filename);
    let mut cg = Codegen::new(attrs);
    cg.header(&filename, generated_at);
    cg.emit(&flat.enums, &structs, &known_enums)?;
    Ok(cg.into_file(filename))
}

impl GeneratedFile {
    pub fn is_empty(&self) -> bool {
        self.extensions == 0
    }

    pub fn contents(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;

    use super::*;
    use crate::ast::{Type, VarDecl};

    #[derive(Default)]
    struct FakeRegistry {
        decoders: BTreeSet<&'static str>,
        encoders: BTreeSet<&'static str>,
    }

    impl CodecRegistry for FakeRegistry {
        fn has_decoder(&self, type_name: &str) -> bool {
            self.decoders.contains(type_name)
        }

        fn has_encoder(&self, type_name: &str) -> bool {
            self.encoders.contains(type_name)
        }
    }

    fn color() -> Enum {
        Enum::new("Color", "String")
    }

    fn point() -> Struct {
        Struct::new("Point", &[], vec![
            VarDecl::new("x", Type::named("Int")),
            VarDecl::new("y", Type::named("Int")),
        ])
    }

    fn generate(registry: &FakeRegistry, enums: &[Enum], structs: &[Struct]) -> Vec<String> {
        let mut cg = Codegen::new(registry);
        cg.emit(enums, structs, enums).unwrap();
        cg.into_file("Out.swift").lines
    }

    #[test]
    fn header_block() {
        let registry = FakeRegistry::default();
        let mut cg = Codegen::new(&registry);
        cg.header("Models+JsonGen.swift", Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap());
        let text = cg.into_file("Models+JsonGen.swift").contents();
        assert_eq!(text, "//\n\
                          //  Models+JsonGen.swift\n\
                          //\n\
                          //  Auto generated by swift-json-gen on Fri, 16 Oct 2026 09:05:07 GMT\n\
                          //  See for details: https://github.com/tomlokhorst/swift-json-gen\n\
                          //\n\
                          \n\
                          import Foundation\n\
                          \n");
    }

    #[test]
    fn enum_extension_has_decoder_blank_encoder() {
        let lines = generate(&FakeRegistry::default(), &[color()], &[]);
        assert_eq!(lines[0], "extension Color {");
        assert_eq!(lines[6], "  }");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "  func encodeJson() -> String {");
        assert_eq!(&lines[lines.len() - 2..], ["}", ""]);
    }

    #[test]
    fn enums_come_before_structs() {
        let lines = generate(&FakeRegistry::default(), &[color()], &[point()]);
        let headers: Vec<_> = lines.iter().filter(|l| l.starts_with("extension ")).collect();
        assert_eq!(headers, ["extension Color {", "extension Point {"]);
    }

    #[test]
    fn existing_encoder_means_decoder_only() {
        let registry = FakeRegistry { encoders: ["Point"].into(), ..Default::default() };
        let lines = generate(&registry, &[], &[point()]);
        assert!(lines.iter().any(|l| l.contains("static func decodeJson")));
        assert!(!lines.iter().any(|l| l.contains("func encodeJson")));
        assert_eq!(lines[lines.len() - 3], "  }", "no blank separator before the closing brace");
    }

    #[test]
    fn existing_decoder_means_encoder_only() {
        let registry = FakeRegistry { decoders: ["Color"].into(), ..Default::default() };
        let lines = generate(&registry, &[color()], &[]);
        assert_eq!(lines, [
            "extension Color {",
            "  func encodeJson() -> String {",
            "    return rawValue",
            "  }",
            "}",
            "",
        ]);
    }

    #[test]
    fn both_existing_means_nothing() {
        let registry = FakeRegistry {
            decoders: ["Point", "Color"].into(),
            encoders: ["Point", "Color"].into(),
        };
        let mut cg = Codegen::new(&registry);
        cg.emit(&[color()], &[point()], &[color()]).unwrap();
        let file = cg.into_file("Out.swift");
        assert!(file.is_empty());
        assert!(file.lines.is_empty());
    }

    #[test]
    fn known_enums_include_ones_not_generated() {
        let registry = FakeRegistry {
            decoders: ["Level"].into(),
            encoders: ["Level"].into(),
        };
        let stats = Struct::new("Stats", &[], vec![VarDecl::new(
            "counts",
            Type::dictionary(Type::named("Level"), Type::named("Int")),
        )]);
        let level = [Enum::new("Level", "Int")];
        let mut cg = Codegen::new(&registry);
        cg.emit(&level, &[stats], &level).unwrap();
        assert_eq!(cg.warnings(), [Warning {
            type_name: "Stats".into(),
            field: "counts".into(),
            key: "Level".into(),
        }]);
        let file = cg.into_file("Out.swift");
        assert!(file.lines.iter().any(|l| l.trim() == field::NON_STRING_KEY_WARNING));
    }

    #[test]
    fn output_names() {
        assert_eq!(output_filename("Models.swift"), "Models+JsonGen.swift");
        assert_eq!(output_filename("Models"), "Models+JsonGen.swift");
    }
}
