use crate::field::Field;
use serde_json::{json, Value};

/// Sortable fields. Anything outside this list falls back to `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Price,
    #[default]
    CreatedAt,
    UpdatedAt,
    Area,
    Bedrooms,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price" => Some(Self::Price),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "specifications.area" => Some(Self::Area),
            "specifications.bedrooms" => Some(Self::Bedrooms),
            _ => None,
        }
    }

    pub fn field(self) -> Field {
        match self {
            Self::Price => Field::Price,
            Self::CreatedAt => Field::CreatedAt,
            Self::UpdatedAt => Field::UpdatedAt,
            Self::Area => Field::Area,
            Self::Bedrooms => Field::Bedrooms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` sorts ascending; every other value sorts descending.
    pub fn parse(value: &str) -> Self {
        if value == "asc" {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Asc
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        Self {
            field: sort_by.and_then(SortField::parse).unwrap_or_default(),
            order: sort_order.map(SortOrder::parse).unwrap_or_default(),
        }
    }

    pub fn to_document(self) -> Value {
        let direction = if self.order.is_ascending() { 1 } else { -1 };
        let mut doc = serde_json::Map::new();
        doc.insert(self.field.field().path().to_string(), json!(direction));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_field_falls_back_to_created_at() {
        let spec = SortSpec::from_params(Some("password"), Some("asc"));
        assert_eq!(spec.field, SortField::CreatedAt);
        assert_eq!(spec.order, SortOrder::Asc);
    }

    #[test]
    fn anything_but_asc_is_descending() {
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("ascending"), SortOrder::Desc);
        assert_eq!(SortSpec::from_params(None, None).order, SortOrder::Desc);
    }

    #[test]
    fn renders_nested_sort_path() {
        let spec = SortSpec::from_params(Some("specifications.area"), Some("asc"));
        assert_eq!(spec.to_document(), json!({ "specifications.area": 1 }));
    }
}
