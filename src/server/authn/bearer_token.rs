use std::sync::Arc;

use actix_web::HttpRequest;
use anyhow::Result;
use log::debug;

use crate::server::db::Database;

use super::token::TokenValidator;
use super::{Authenticator, AuthnResponse, AuthnUserInfo};

const INVALID_TOKEN: &str = "Invalid token";

/// Authenticates `Authorization: Bearer <token>` headers. The token subject
/// is a user id; the user is loaded so that roles reflect the current record.
pub struct BearerTokenAuthenticator<T: TokenValidator> {
    validator: T,
    db: Arc<Database>,
}

impl<T: TokenValidator> BearerTokenAuthenticator<T> {
    pub fn new(validator: T, db: Arc<Database>) -> Self {
        Self { validator, db }
    }
}

impl<T: TokenValidator + Sync + Send> Authenticator for BearerTokenAuthenticator<T> {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        _user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        let auth = match req.headers().get("Authorization") {
            Some(auth) => match auth.to_str() {
                Ok(auth) => auth.trim().to_string(),
                Err(_) => return Ok(AuthnResponse::Unauthenticated(INVALID_TOKEN)),
            },
            None => return Ok(AuthnResponse::Continue),
        };

        if auth.is_empty() {
            return Ok(AuthnResponse::Continue);
        }

        let mut iter = auth.split_whitespace();
        match iter.next() {
            Some(bearer) if bearer.eq_ignore_ascii_case("bearer") => {}
            _ => return Ok(AuthnResponse::Unauthenticated(INVALID_TOKEN)),
        }

        let token = match iter.next() {
            Some(token) => token,
            None => return Ok(AuthnResponse::Unauthenticated(INVALID_TOKEN)),
        };
        if iter.next().is_some() {
            return Ok(AuthnResponse::Unauthenticated(INVALID_TOKEN));
        }

        let id = match self.validator.validate_token(token) {
            Ok(id) => id,
            Err(e) => {
                debug!("Reject bearer token: {e:#}");
                return Ok(AuthnResponse::Unauthenticated(INVALID_TOKEN));
            }
        };

        let user = match self.db.with_transaction(|tx| tx.get_user(&id))? {
            Some(user) => user,
            None => return Ok(AuthnResponse::Unauthenticated("User no longer exists")),
        };

        Ok(AuthnResponse::Ok(AuthnUserInfo {
            id: user.id,
            display_name: user.display_name,
            roles: user.roles,
            is_anonymous: false,
        }))
    }
}
