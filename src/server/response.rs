use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::types::response::ErrorResponse;

use super::error::ApiError;

/// A wrapper struct for HTTP responses that provides convenient methods
/// for creating common response types
#[derive(Debug)]
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    pub fn json<T: Serialize>(data: T) -> Self {
        Self {
            http_response: HttpResponse::Ok().json(data),
        }
    }

    pub fn error(err: ApiError) -> Self {
        Self::err_response(err.status(), err.to_string())
    }

    fn err_response(status: StatusCode, message: String) -> Self {
        let resp = ErrorResponse { message };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        Self::error(err)
    }
}

impl From<Result<Response, ApiError>> for Response {
    fn from(result: Result<Response, ApiError>) -> Self {
        match result {
            Ok(resp) => resp,
            Err(err) => err.into(),
        }
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
