use anyhow::Result;

use super::union::UnionAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Runs authorizers in order until one of them decides. A chain that ends
/// undecided denies the request.
pub struct ChainAuthorizer {
    authorizers: Vec<UnionAuthorizer>,
}

impl ChainAuthorizer {
    pub fn new(authorizers: Vec<UnionAuthorizer>) -> Self {
        Self { authorizers }
    }
}

impl Authorizer for ChainAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        for authorizer in self.authorizers.iter() {
            match authorizer.authorize_request(req)? {
                AuthzResponse::Ok => return Ok(AuthzResponse::Ok),
                AuthzResponse::Continue => continue,
                AuthzResponse::Unauthorized => return Ok(AuthzResponse::Unauthorized),
            }
        }

        Ok(AuthzResponse::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::server::authn::AuthnUserInfo;
    use crate::server::authz::config::builtin_roles;
    use crate::server::authz::owner::OwnerAuthorizer;
    use crate::server::authz::rule::{RoleTable, RuleAuthorizer};
    use crate::server::authz::Operation;

    use super::*;

    fn build_chain() -> ChainAuthorizer {
        let table = Arc::new(RoleTable::new(builtin_roles()));
        ChainAuthorizer::new(vec![
            UnionAuthorizer::Owner(OwnerAuthorizer::new()),
            UnionAuthorizer::Rule(RuleAuthorizer::new(table)),
        ])
    }

    #[test]
    fn test_chain() {
        let chain = build_chain();
        let alice = AuthnUserInfo::new_test("alice", &["user"]);
        let admin = AuthnUserInfo::new_test("root", &["admin", "user"]);
        let anonymous = AuthnUserInfo::anonymous();

        let route = "/api/hotels/:hotelId";
        let cases = [
            // Owner bypass beats the role table
            (&alice, Operation::Update, Some("alice"), AuthzResponse::Ok),
            (&alice, Operation::Delete, Some("alice"), AuthzResponse::Ok),
            (&alice, Operation::Update, Some("bob"), AuthzResponse::Unauthorized),
            (&alice, Operation::Read, Some("bob"), AuthzResponse::Ok),
            (&admin, Operation::Delete, Some("bob"), AuthzResponse::Ok),
            (&admin, Operation::Update, None, AuthzResponse::Ok),
            (&anonymous, Operation::Read, None, AuthzResponse::Ok),
            (&anonymous, Operation::Delete, None, AuthzResponse::Unauthorized),
        ];
        for (user, operation, owner, expect) in cases {
            let req = AuthzRequest {
                route,
                operation,
                user,
                owner,
            };
            assert_eq!(chain.authorize_request(&req).unwrap(), expect, "{req:?}");
        }

        // The owner bypass does not mask a broken role table
        let ghost = AuthnUserInfo::new_test("casper", &["ghost"]);
        let req = AuthzRequest {
            route,
            operation: Operation::Update,
            user: &ghost,
            owner: Some("casper"),
        };
        assert_eq!(chain.authorize_request(&req).unwrap(), AuthzResponse::Ok);
        let req = AuthzRequest {
            route,
            operation: Operation::Update,
            user: &ghost,
            owner: None,
        };
        assert!(chain.authorize_request(&req).is_err());

        // An empty chain denies
        let empty = ChainAuthorizer::new(vec![]);
        let req = AuthzRequest {
            route,
            operation: Operation::Read,
            user: &admin,
            owner: None,
        };
        assert_eq!(
            empty.authorize_request(&req).unwrap(),
            AuthzResponse::Unauthorized
        );
    }
}
