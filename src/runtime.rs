//! Swift support file that generated code calls into: the marker
//! typealiases and codecs for primitives, `Optional`, `Array` and
//! `Dictionary`.

pub const FILENAME: &str = "JsonGen.swift";

pub const SOURCE: &str = include_str!("runtime/JsonGen.swift");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_the_marker_types() {
        for marker in ["AnyJson", "JsonObject", "JsonArray"] {
            assert!(SOURCE.contains(&format!("public typealias {marker} =")), "{marker}");
        }
    }

    #[test]
    fn covers_the_containers_generated_code_calls() {
        for container in ["Optional", "Array", "Dictionary"] {
            assert!(SOURCE.contains(&format!("extension {container} {{")), "{container}");
        }
    }
}
