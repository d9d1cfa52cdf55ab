pub mod api;
pub mod auth;
pub mod healthz;
pub mod resources;

use actix_web::HttpRequest;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::response::Response;

pub trait Handler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response;
}

/// Decodes an optional JSON request body. A missing or blank body decodes as
/// the type's default.
pub fn parse_json_body<T>(body: Option<Vec<u8>>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    let body = match body {
        Some(body) if !body.iter().all(u8::is_ascii_whitespace) => body,
        _ => return Ok(T::default()),
    };
    serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest(String::from("Invalid JSON body")))
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value};

    use crate::types::entity::HotelsByCityRequest;

    use super::*;

    #[test]
    fn test_parse_json_body() {
        let map: Map<String, Value> = parse_json_body(None).unwrap();
        assert!(map.is_empty());
        let map: Map<String, Value> = parse_json_body(Some(b"  \n".to_vec())).unwrap();
        assert!(map.is_empty());

        let map: Map<String, Value> = parse_json_body(Some(br#"{"name":"Paris"}"#.to_vec())).unwrap();
        assert_eq!(map["name"], Value::from("Paris"));

        let req: HotelsByCityRequest = parse_json_body(Some(b"{}".to_vec())).unwrap();
        assert_eq!(req.name, "");

        assert!(parse_json_body::<Map<String, Value>>(Some(b"[1, 2]".to_vec())).is_err());
        assert!(parse_json_body::<Map<String, Value>>(Some(b"{name".to_vec())).is_err());
    }
}
