use actix_web::http::StatusCode;
use thiserror::Error;

use super::resource::ResourceKind;

/// Errors surfaced to API clients. Each variant maps to one status code and
/// is rendered as a `{"message": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{} is invalid", .0.name)]
    InvalidIdentifier(&'static ResourceKind),

    #[error("{0}")]
    NotFound(String),

    #[error("User is not authorized")]
    Unauthorized,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Unexpected authorization error")]
    AuthorizationSystem,

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error")]
    Database,

    #[error("Unexpected token error")]
    Token,

    #[error("No route to {0}")]
    NoRoute(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidIdentifier(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::AuthorizationSystem | ApiError::Database | ApiError::Token => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::resource::{CITY, HOTEL};

    use super::*;

    #[test]
    fn test_messages() {
        let cases = [
            (
                ApiError::InvalidIdentifier(&CITY),
                StatusCode::BAD_REQUEST,
                "City is invalid",
            ),
            (
                ApiError::NotFound(HOTEL.not_found_message()),
                StatusCode::NOT_FOUND,
                "No Hotel with that identifier has been found",
            ),
            (
                ApiError::Unauthorized,
                StatusCode::FORBIDDEN,
                "User is not authorized",
            ),
            (
                ApiError::AuthorizationSystem,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected authorization error",
            ),
            (
                ApiError::Validation(CITY.required_name_message()),
                StatusCode::BAD_REQUEST,
                "Please fill City name",
            ),
            (
                ApiError::NoRoute(String::from("GET /nothing")),
                StatusCode::NOT_FOUND,
                "No route to GET /nothing",
            ),
            (
                ApiError::Unauthenticated(String::from("Invalid token")),
                StatusCode::UNAUTHORIZED,
                "Invalid token",
            ),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.to_string(), message);
        }
    }
}
