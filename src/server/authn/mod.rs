mod anonymous;
mod bearer_token;
mod union;

pub mod chain;
pub mod config;
pub mod factory;
pub mod token;

use actix_web::HttpRequest;
use anyhow::Result;

use super::authz::config::ROLE_GUEST;

/// Trait for request authenticators.
///
/// Authenticators are chained: each one receives the principal produced by
/// the previous ones (if any) and may accept it, replace it, skip, or reject
/// the request outright.
pub trait Authenticator: Send + Sync {
    /// * `Ok(AuthnResponse::Ok(user))` - the request acts as `user`
    /// * `Ok(AuthnResponse::Continue)` - no decision, try the next one
    /// * `Ok(AuthnResponse::Unauthenticated(msg))` - stop, the request is rejected
    /// * `Err(_)` - internal failure
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse>;
}

#[derive(Debug)]
pub enum AuthnResponse {
    Ok(AuthnUserInfo),
    Continue,
    Unauthenticated(&'static str),
}

/// The caller of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthnUserInfo {
    /// User identifier, empty for anonymous callers.
    pub id: String,
    pub display_name: String,
    pub roles: Vec<String>,
    pub is_anonymous: bool,
}

impl AuthnUserInfo {
    pub fn anonymous() -> Self {
        Self {
            id: String::new(),
            display_name: String::new(),
            roles: vec![String::from(ROLE_GUEST)],
            is_anonymous: true,
        }
    }

    /// The identifier used for ownership, `None` for anonymous callers.
    pub fn caller_id(&self) -> Option<&str> {
        if self.is_anonymous || self.id.is_empty() {
            return None;
        }
        Some(&self.id)
    }

    #[cfg(test)]
    pub fn new_test(id: &str, roles: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_anonymous: false,
        }
    }
}
