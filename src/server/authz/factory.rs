use std::sync::Arc;

use super::chain::ChainAuthorizer;
use super::config::AuthzConfig;
use super::owner::OwnerAuthorizer;
use super::rule::{RoleTable, RuleAuthorizer};
use super::union::UnionAuthorizer;

pub struct AuthzFactory;

impl AuthzFactory {
    pub fn new() -> Self {
        Self
    }

    /// The owner check runs first so that owners may manage their own
    /// entities regardless of role.
    pub fn build_authorizer(&self, cfg: &AuthzConfig) -> ChainAuthorizer {
        let table = Arc::new(RoleTable::new(cfg.roles.clone()));

        let authorizers = vec![
            UnionAuthorizer::Owner(OwnerAuthorizer::new()),
            UnionAuthorizer::Rule(RuleAuthorizer::new(table)),
        ];

        ChainAuthorizer::new(authorizers)
    }
}
