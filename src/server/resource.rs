use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// Static description of one kind of catalog entity. Every kind shares the
/// same handlers, store and policy code; only this configuration differs.
#[derive(Debug)]
pub struct ResourceKind {
    /// Human readable name, used in messages.
    pub name: &'static str,
    /// Path segment under `/api`.
    pub path: &'static str,
    /// Name of the identifier parameter in the item route.
    pub param: &'static str,
    /// Mutable payload fields besides `name`.
    pub fields: &'static [FieldSpec],
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Alternative body keys accepted on input. Output always uses `name`.
    pub aliases: &'static [&'static str],
    pub field_type: FieldType,
    pub default: FieldDefault,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Text,
    Number,
    /// Identifier of another entity.
    Reference,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Null,
    Text(&'static str),
    Integer(i64),
}

/// Validated name and payload, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityContent {
    pub name: String,
    pub payload: Map<String, Value>,
}

pub static CITY: ResourceKind = ResourceKind {
    name: "City",
    path: "cities",
    param: "cityId",
    fields: &[],
};

pub static HOTEL: ResourceKind = ResourceKind {
    name: "Hotel",
    path: "hotels",
    param: "hotelId",
    fields: &[
        FieldSpec {
            name: "city",
            aliases: &[],
            field_type: FieldType::Reference,
            default: FieldDefault::Null,
        },
        FieldSpec {
            name: "address",
            aliases: &["Address"],
            field_type: FieldType::Text,
            default: FieldDefault::Text(""),
        },
        FieldSpec {
            name: "phone",
            aliases: &["Phone"],
            field_type: FieldType::Text,
            default: FieldDefault::Text(""),
        },
        FieldSpec {
            name: "img",
            aliases: &[],
            field_type: FieldType::Text,
            default: FieldDefault::Text(""),
        },
        FieldSpec {
            name: "description",
            aliases: &[],
            field_type: FieldType::Text,
            default: FieldDefault::Text(""),
        },
        FieldSpec {
            name: "latitude",
            aliases: &[],
            field_type: FieldType::Number,
            default: FieldDefault::Integer(0),
        },
        FieldSpec {
            name: "longitude",
            aliases: &["longtitude"],
            field_type: FieldType::Number,
            default: FieldDefault::Integer(0),
        },
        FieldSpec {
            name: "total_rooms",
            aliases: &[],
            field_type: FieldType::Number,
            default: FieldDefault::Integer(10),
        },
    ],
};

pub static TOURIST: ResourceKind = ResourceKind {
    name: "Tourist",
    path: "tourists",
    param: "touristId",
    fields: &[],
};

pub static KINDS: &[&ResourceKind] = &[&CITY, &HOTEL, &TOURIST];

impl ResourceKind {
    pub fn collection_route(&self) -> String {
        format!("/api/{}", self.path)
    }

    pub fn item_route(&self) -> String {
        format!("/api/{}/:{}", self.path, self.param)
    }

    pub fn not_found_message(&self) -> String {
        format!("No {} with that identifier has been found", self.name)
    }

    pub fn required_name_message(&self) -> String {
        format!("Please fill {} name", self.name)
    }

    fn invalid_field_message(&self, field: &str) -> String {
        format!("Invalid value for {} field '{}'", self.name, field)
    }

    /// Validates the body of a create request. Fields the kind does not
    /// declare, including `_id`, `user` and `created`, are ignored.
    pub fn validate_new(&self, body: &Map<String, Value>) -> Result<EntityContent, String> {
        let name = self.validate_name(body.get("name"))?;

        let mut payload = Map::new();
        for field in self.fields.iter() {
            let value = match field.lookup(body) {
                Some(value) => self.validate_field(field, value)?,
                None => field.default.to_value(),
            };
            payload.insert(field.name.to_string(), value);
        }

        Ok(EntityContent { name, payload })
    }

    /// Merges the declared fields present in `patch` over `current`. Fields
    /// absent from the patch keep their stored value.
    pub fn apply_patch(
        &self,
        current: &EntityContent,
        patch: &Map<String, Value>,
    ) -> Result<EntityContent, String> {
        let name = match patch.get("name") {
            Some(value) => self.validate_name(Some(value))?,
            None => current.name.clone(),
        };

        let mut payload = Map::new();
        for field in self.fields.iter() {
            let value = match field.lookup(patch) {
                Some(value) => self.validate_field(field, value)?,
                None => match current.payload.get(field.name) {
                    Some(value) => value.clone(),
                    None => field.default.to_value(),
                },
            };
            payload.insert(field.name.to_string(), value);
        }

        Ok(EntityContent { name, payload })
    }

    fn validate_name(&self, value: Option<&Value>) -> Result<String, String> {
        match value {
            None | Some(Value::Null) => Err(self.required_name_message()),
            Some(Value::String(name)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(self.required_name_message());
                }
                Ok(name.to_string())
            }
            Some(_) => Err(self.invalid_field_message("name")),
        }
    }

    fn validate_field(&self, field: &FieldSpec, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return Ok(field.default.to_value());
        }

        let invalid = || self.invalid_field_message(field.name);
        match field.field_type {
            FieldType::Text => match value {
                Value::String(s) => Ok(Value::String(s.trim().to_string())),
                _ => Err(invalid()),
            },
            FieldType::Number => match value {
                Value::Number(_) => Ok(value.clone()),
                // Form posts deliver numbers as strings
                Value::String(s) => parse_number(s.trim()).ok_or_else(invalid),
                _ => Err(invalid()),
            },
            FieldType::Reference => match value {
                Value::String(s) if is_valid_identifier(s) => Ok(value.clone()),
                _ => Err(invalid()),
            },
        }
    }
}

impl FieldSpec {
    fn lookup<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Value> {
        body.get(self.name).or_else(|| {
            self.aliases
                .iter()
                .find_map(|alias| body.get(*alias))
        })
    }
}

impl FieldDefault {
    fn to_value(self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::Text(s) => Value::String(s.to_string()),
            FieldDefault::Integer(n) => Value::Number(n.into()),
        }
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    let n = s.parse::<f64>().ok()?;
    Number::from_f64(n).map(Value::Number)
}

/// Generates a new entity or user identifier.
pub fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// Identifiers are canonical lower case hyphenated UUIDs.
pub fn is_valid_identifier(raw: &str) -> bool {
    match Uuid::try_parse(raw) {
        Ok(id) => id.hyphenated().to_string() == raw,
        Err(_) => false,
    }
}

pub fn find_kind(path: &str) -> Option<&'static ResourceKind> {
    KINDS.iter().copied().find(|kind| kind.path == path)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expect object"),
        }
    }

    #[test]
    fn test_routes() {
        assert_eq!(CITY.collection_route(), "/api/cities");
        assert_eq!(CITY.item_route(), "/api/cities/:cityId");
        assert_eq!(HOTEL.item_route(), "/api/hotels/:hotelId");
        assert_eq!(TOURIST.collection_route(), "/api/tourists");

        assert_eq!(
            CITY.not_found_message(),
            "No City with that identifier has been found"
        );
        assert_eq!(TOURIST.required_name_message(), "Please fill Tourist name");

        assert!(std::ptr::eq(find_kind("hotels").unwrap(), &HOTEL));
        assert!(find_kind("users").is_none());
    }

    #[test]
    fn test_identifier() {
        let id = new_identifier();
        assert!(is_valid_identifier(&id));
        assert_ne!(id, new_identifier());

        assert!(is_valid_identifier("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_valid_identifier("67E55044-10B1-426F-9247-BB680E5FE0C8"));
        assert!(!is_valid_identifier("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_valid_identifier("invalid-id"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_validate_new() {
        let content = CITY.validate_new(&object(json!({"name": "  Paris "}))).unwrap();
        assert_eq!(content.name, "Paris");
        assert!(content.payload.is_empty());

        // Reserved and unknown fields are ignored
        let content = CITY
            .validate_new(&object(json!({
                "name": "Rome",
                "_id": "x",
                "user": "someone",
                "created": "yesterday",
                "isCurrentUserOwner": true,
                "extra": 1,
            })))
            .unwrap();
        assert_eq!(content.name, "Rome");
        assert!(content.payload.is_empty());

        for body in [json!({}), json!({"name": ""}), json!({"name": "   "}), json!({"name": null})] {
            let err = CITY.validate_new(&object(body)).unwrap_err();
            assert_eq!(err, "Please fill City name");
        }
        let err = CITY.validate_new(&object(json!({"name": 12}))).unwrap_err();
        assert_eq!(err, "Invalid value for City field 'name'");

        let content = HOTEL.validate_new(&object(json!({"name": "Ritz"}))).unwrap();
        assert_eq!(
            Value::Object(content.payload),
            json!({
                "city": null,
                "address": "",
                "phone": "",
                "img": "",
                "description": "",
                "latitude": 0,
                "longitude": 0,
                "total_rooms": 10,
            })
        );

        let city = new_identifier();
        let content = HOTEL
            .validate_new(&object(json!({
                "name": "Ritz",
                "city": city,
                "phone": " 123 ",
                "latitude": "48.5",
                "longitude": 2.25,
                "total_rooms": "25",
            })))
            .unwrap();
        assert_eq!(content.payload["city"], json!(city));
        assert_eq!(content.payload["phone"], json!("123"));
        assert_eq!(content.payload["latitude"], json!(48.5));
        assert_eq!(content.payload["longitude"], json!(2.25));
        assert_eq!(content.payload["total_rooms"], json!(25));

        let content = HOTEL
            .validate_new(&object(json!({
                "name": "Ritz",
                "Address": "15 Place Vendome",
                "phone": "1",
                "Phone": "2",
                "longtitude": "2.33",
            })))
            .unwrap();
        assert_eq!(content.payload["address"], json!("15 Place Vendome"));
        assert_eq!(content.payload["phone"], json!("1"));
        assert_eq!(content.payload["longitude"], json!(2.33));
        assert!(content.payload.get("longtitude").is_none());

        let err = HOTEL
            .validate_new(&object(json!({"name": "Ritz", "city": "paris"})))
            .unwrap_err();
        assert_eq!(err, "Invalid value for Hotel field 'city'");
        let err = HOTEL
            .validate_new(&object(json!({"name": "Ritz", "total_rooms": "many"})))
            .unwrap_err();
        assert_eq!(err, "Invalid value for Hotel field 'total_rooms'");
        let err = HOTEL
            .validate_new(&object(json!({"name": "Ritz", "phone": 123})))
            .unwrap_err();
        assert_eq!(err, "Invalid value for Hotel field 'phone'");
    }

    #[test]
    fn test_apply_patch() {
        let current = HOTEL
            .validate_new(&object(json!({"name": "Ritz", "phone": "123", "total_rooms": 30})))
            .unwrap();

        let patched = HOTEL
            .apply_patch(&current, &object(json!({"phone": "456", "owner": "x", "_id": "y"})))
            .unwrap();
        assert_eq!(patched.name, "Ritz");
        assert_eq!(patched.payload["phone"], json!("456"));
        assert_eq!(patched.payload["total_rooms"], json!(30));

        let patched = HOTEL
            .apply_patch(&current, &object(json!({"name": " Savoy ", "total_rooms": null})))
            .unwrap();
        assert_eq!(patched.name, "Savoy");
        assert_eq!(patched.payload["total_rooms"], json!(10));

        // Legacy key spellings are accepted and stored under the canonical name
        let patched = HOTEL
            .apply_patch(
                &current,
                &object(json!({"Address": " 1 Rue ", "Phone": "789", "longtitude": 2.5})),
            )
            .unwrap();
        assert_eq!(patched.payload["address"], json!("1 Rue"));
        assert_eq!(patched.payload["phone"], json!("789"));
        assert_eq!(patched.payload["longitude"], json!(2.5));
        assert!(patched.payload.get("Address").is_none());

        let err = HOTEL
            .apply_patch(&current, &object(json!({"name": ""})))
            .unwrap_err();
        assert_eq!(err, "Please fill Hotel name");

        // Entities stored before a field existed get its default
        let legacy = EntityContent {
            name: String::from("Old"),
            payload: Map::new(),
        };
        let patched = HOTEL.apply_patch(&legacy, &Map::new()).unwrap();
        assert_eq!(patched.payload["total_rooms"], json!(10));
        assert_eq!(patched.payload["city"], Value::Null);
    }
}
