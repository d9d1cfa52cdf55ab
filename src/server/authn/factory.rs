use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use crate::server::db::Database;

use super::anonymous::AnonymousAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::chain::ChainAuthenticator;
use super::config::AuthnConfig;
use super::token::factory::TokenFactory;
use super::token::jwt::JwtTokenValidator;
use super::union::UnionAuthenticator;

/// Builds the authentication chain: bearer token first, then the anonymous
/// fallback when enabled.
pub struct AuthnFactory;

impl AuthnFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_authenticator(
        &self,
        cfg: &AuthnConfig,
        token_factory: &TokenFactory,
        db: Arc<Database>,
    ) -> Result<ChainAuthenticator<JwtTokenValidator>> {
        let mut authenticators = Vec::new();

        let jwt = token_factory.build_token_validator()?;
        let token_auth = BearerTokenAuthenticator::new(jwt, db);
        authenticators.push(UnionAuthenticator::BearerToken(token_auth));

        if cfg.allow_anonymous {
            info!("Anonymous access is enabled, unauthenticated requests act as guest");
            authenticators.push(UnionAuthenticator::Anonymous(AnonymousAuthenticator::new()));
        } else {
            warn!("Anonymous access is disabled");
        }

        Ok(ChainAuthenticator::new(authenticators))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use crate::config::CommonConfig;
    use crate::server::authn::{Authenticator, AuthnResponse, AuthnUserInfo};

    use super::*;

    fn is_anonymous_enabled(chain: &ChainAuthenticator<JwtTokenValidator>) -> bool {
        chain
            .authenticators()
            .iter()
            .any(|auth| matches!(auth, UnionAuthenticator::Anonymous(_)))
    }

    #[test]
    fn test_factory() {
        let factory = AuthnFactory::new();
        let token_factory = TokenFactory::new_test();
        let db = Arc::new(Database::new_test());
        let req = TestRequest::default().to_http_request();

        let cfg = AuthnConfig::default();
        let chain = factory
            .build_authenticator(&cfg, &token_factory, db.clone())
            .unwrap();
        assert_eq!(chain.authenticators().len(), 2);
        assert!(is_anonymous_enabled(&chain));
        match chain.authenticate_request(&req, None).unwrap() {
            AuthnResponse::Ok(user) => assert_eq!(user, AuthnUserInfo::anonymous()),
            resp => panic!("unexpected response: {resp:?}"),
        }

        let mut cfg = AuthnConfig::default();
        cfg.allow_anonymous = false;
        let chain = factory
            .build_authenticator(&cfg, &token_factory, db)
            .unwrap();
        assert_eq!(chain.authenticators().len(), 1);
        assert!(!is_anonymous_enabled(&chain));
        assert!(matches!(
            chain.authenticate_request(&req, None).unwrap(),
            AuthnResponse::Continue
        ));

        // A bad token is never downgraded to anonymous
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer bad"))
            .to_http_request();
        let cfg = AuthnConfig::default();
        let chain = factory
            .build_authenticator(&cfg, &token_factory, Arc::new(Database::new_test()))
            .unwrap();
        assert!(matches!(
            chain.authenticate_request(&req, None).unwrap(),
            AuthnResponse::Unauthenticated(_)
        ));
    }
}
