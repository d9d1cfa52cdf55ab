use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON representation of a catalog entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityView {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    pub created: String,

    /// Display projection of the creating user. Absent when the entity was
    /// created anonymously or its creator no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerView>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,

    #[serde(rename = "isCurrentUserOwner")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current_user_owner: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerView {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HotelsByCityRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelsByCityResponse {
    pub hotels: Vec<EntityView>,
    pub totalnumber: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entity_view_json() {
        let mut payload = Map::new();
        payload.insert(String::from("phone"), json!("123"));

        let view = EntityView {
            id: String::from("e1"),
            name: String::from("Paris"),
            created: String::from("2024-01-01T00:00:00.000Z"),
            user: Some(OwnerView {
                id: String::from("u1"),
                display_name: String::from("Alice"),
            }),
            payload,
            is_current_user_owner: Some(true),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(
            value,
            json!({
                "_id": "e1",
                "name": "Paris",
                "created": "2024-01-01T00:00:00.000Z",
                "user": {"_id": "u1", "displayName": "Alice"},
                "phone": "123",
                "isCurrentUserOwner": true,
            })
        );

        let view = EntityView {
            user: None,
            payload: Map::new(),
            is_current_user_owner: None,
            ..view
        };
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("user").is_none());
        assert!(value.get("isCurrentUserOwner").is_none());
    }
}
