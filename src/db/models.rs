use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    #[serde(rename = "category_id")]
    #[sqlx(rename = "category_id")]
    pub id: i32,
    #[serde(rename = "category_name")]
    #[sqlx(rename = "category_name")]
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(id: i32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Body of create and update requests. Missing fields decode as empty
/// strings so they fail validation rather than JSON decoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryPayload {
    #[serde(rename = "category_name")]
    pub name: String,
    pub description: String,
}

impl CategoryPayload {
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.description.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_json_field_names() {
        let category = Category::new(1, "Beverages", "Soft drinks");
        assert_eq!(
            serde_json::to_value(&category).unwrap(),
            json!({ "category_id": 1, "category_name": "Beverages", "description": "Soft drinks" })
        );
    }

    #[test]
    fn test_payload_missing_fields_default_to_empty() {
        let payload: CategoryPayload = serde_json::from_str(r#"{"category_name":"Beverages"}"#).unwrap();
        assert_eq!(payload.name, "Beverages");
        assert_eq!(payload.description, "");
        assert!(!payload.is_complete());

        let payload: CategoryPayload =
            serde_json::from_str(r#"{"category_name":"Beverages","description":"Soft drinks"}"#).unwrap();
        assert!(payload.is_complete());
    }
}
