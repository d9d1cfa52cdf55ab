use anyhow::Result;

use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Grants every operation on an entity to the user who created it.
/// Everything else is deferred to the next authorizer.
pub struct OwnerAuthorizer;

impl OwnerAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for OwnerAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        let (owner, caller) = match (req.owner, req.user.caller_id()) {
            (Some(owner), Some(caller)) => (owner, caller),
            _ => return Ok(AuthzResponse::Continue),
        };

        if owner == caller {
            return Ok(AuthzResponse::Ok);
        }
        Ok(AuthzResponse::Continue)
    }
}

#[cfg(test)]
mod tests {
    use crate::server::authn::AuthnUserInfo;

    use super::super::Operation;
    use super::*;

    #[test]
    fn test_owner_authorizer() {
        let authorizer = OwnerAuthorizer::new();
        let alice = AuthnUserInfo::new_test("alice", &["user"]);
        let anonymous = AuthnUserInfo::anonymous();

        let cases = [
            (&alice, Some("alice"), AuthzResponse::Ok),
            (&alice, Some("bob"), AuthzResponse::Continue),
            (&alice, None, AuthzResponse::Continue),
            (&anonymous, None, AuthzResponse::Continue),
            // Anonymous callers never match, even against an empty owner
            (&anonymous, Some(""), AuthzResponse::Continue),
        ];
        for (user, owner, expect) in cases {
            for operation in [Operation::Update, Operation::Delete, Operation::Read] {
                let req = AuthzRequest {
                    route: "/api/cities/:cityId",
                    operation,
                    user,
                    owner,
                };
                assert_eq!(authorizer.authorize_request(&req).unwrap(), expect);
            }
        }
    }
}
