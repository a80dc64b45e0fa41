//! Raw-value enums: decode through `init(rawValue:)`, encode as `rawValue`.

use crate::ast::Enum;

pub fn make_enum_decoder(en: &Enum) -> Vec<String> {
    vec![
        format!("  static func decodeJson(json: AnyObject) -> {}? {{", en.base_name),
        format!("    if let value = json as? {} {{", en.raw_type_name),
        format!("      return {}(rawValue: value)", en.base_name),
        "    }".to_string(),
        "    return nil".to_string(),
        "  }".to_string(),
    ]
}

pub fn make_enum_encoder(en: &Enum) -> Vec<String> {
    vec![
        format!("  func encodeJson() -> {} {{", en.raw_type_name),
        "    return rawValue".to_string(),
        "  }".to_string(),
    ]
}
