use serde::de::DeserializeOwned;

/// Deserialize with the JSON path of the offending node in the message, e.g.
/// `declarations[2]: missing field `baseName``.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(describe)
}

/// Same, for documents that went through a jq filter first.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(describe)
}

fn describe<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> String {
    let path = err.path().to_string();
    format!("at JSON path {path} → {}", err.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceFile;

    #[test]
    fn reports_the_failing_path() {
        let src = r#"{ "filename": "A.swift", "declarations": [
            { "kind": "struct", "baseName": "A", "varDecls": [{ "name": "x", "type": {} }] }
        ] }"#;
        let err = from_str_with_path::<SourceFile>(src).unwrap_err();
        assert!(err.contains("declarations[0]"), "{err}");
        assert!(err.contains("baseName"), "{err}");
    }

    #[test]
    fn values_deserialize_too() {
        let value = serde_json::json!({ "filename": "A.swift", "declarations": [] });
        let file = from_value_with_path::<SourceFile>(value).unwrap();
        assert_eq!(file.filename, "A.swift");
    }
}
