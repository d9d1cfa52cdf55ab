use actix_web::HttpRequest;
use anyhow::Result;

use super::{Authenticator, AuthnResponse, AuthnUserInfo};

/// Fallback at the end of the chain. Keeps an already authenticated caller,
/// otherwise lets the request through as an anonymous guest.
pub struct AnonymousAuthenticator;

impl AnonymousAuthenticator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Authenticator for AnonymousAuthenticator {
    fn authenticate_request(
        &self,
        _req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        if let Some(user) = user {
            return Ok(AuthnResponse::Ok(user));
        }

        Ok(AuthnResponse::Ok(AuthnUserInfo::anonymous()))
    }
}
