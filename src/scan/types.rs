use serde::{Deserialize, Serialize};

/// Declared data type of a test-step input, as rendered by the host page's
/// type selector. `Json`, `Array`, `Map` and `StructuredData` deliberately
/// share parse/stringify behavior: the host treats them all as nested JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Text,
    Json,
    Boolean,
    Number,
    Integer,
    Array,
    Date,
    DateTime,
    Map,
    Url,
    StructuredData,
}

impl TypeTag {
    /// Tags whose values are nested JSON documents.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            TypeTag::Json | TypeTag::Array | TypeTag::Map | TypeTag::StructuredData
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TypeTag::Text => "Text",
            TypeTag::Json => "Json",
            TypeTag::Boolean => "Boolean",
            TypeTag::Number => "Number",
            TypeTag::Integer => "Integer",
            TypeTag::Array => "Array",
            TypeTag::Date => "Date",
            TypeTag::DateTime => "DateTime",
            TypeTag::Map => "Map",
            TypeTag::Url => "Url",
            TypeTag::StructuredData => "StructuredData",
        }
    }
}

/// Map a freeform type label from the page to a canonical tag.
///
/// Total function: trims, lowercases, looks up the known spellings (the host
/// ships an "interger" typo in some deployments) and falls back to `Text` for
/// anything unrecognized or empty.
pub fn normalize_type(label: Option<&str>) -> TypeTag {
    let Some(label) = label else {
        return TypeTag::Text;
    };

    match label.trim().to_lowercase().as_str() {
        "text" => TypeTag::Text,
        "json" => TypeTag::Json,
        "boolean" => TypeTag::Boolean,
        "number" => TypeTag::Number,
        "integer" => TypeTag::Integer,
        "interger" => TypeTag::Integer, // host-side typo
        "array" => TypeTag::Array,
        "date" => TypeTag::Date,
        "datetime" => TypeTag::DateTime,
        "map" => TypeTag::Map,
        "url" => TypeTag::Url,
        "structured data" => TypeTag::StructuredData,
        _ => TypeTag::Text,
    }
}
