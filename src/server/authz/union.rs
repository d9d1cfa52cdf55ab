use anyhow::Result;

use super::owner::OwnerAuthorizer;
use super::rule::RuleAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

pub enum UnionAuthorizer {
    Owner(OwnerAuthorizer),
    Rule(RuleAuthorizer),
}

impl Authorizer for UnionAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        match self {
            UnionAuthorizer::Owner(o) => o.authorize_request(req),
            UnionAuthorizer::Rule(r) => r.authorize_request(req),
        }
    }
}
