use actix_web::HttpRequest;

use crate::server::response::Response;
use crate::time::{current_timestamp, format_rfc3339};
use crate::types::healthz::HealthzResponse;

use super::Handler;

pub struct HealthzHandler;

impl HealthzHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for HealthzHandler {
    fn handle(&self, _path: &str, _req: HttpRequest, _body: Option<Vec<u8>>) -> Response {
        let response = HealthzResponse {
            now: format_rfc3339(current_timestamp()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        Response::json(response)
    }
}
