use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};

use super::config::RoleRule;
use super::{Authorizer, AuthzRequest, AuthzResponse, Operation};

/// Role name to granted rules. Built once at startup and shared read-only
/// between requests.
#[derive(Debug)]
pub struct RoleTable {
    roles: HashMap<String, Vec<RoleRule>>,
}

impl RoleTable {
    pub fn new(roles: HashMap<String, Vec<RoleRule>>) -> Self {
        Self { roles }
    }

    /// Returns whether any of `roles` grants `operation` on `route`. Roles
    /// missing from the table grant nothing; when no other role grants the
    /// request, a missing role is an error rather than a denial.
    pub fn is_granted(&self, roles: &[String], route: &str, operation: Operation) -> Result<bool> {
        let mut unknown = None;
        for role in roles.iter() {
            match self.roles.get(role) {
                Some(rules) if is_authorized(rules, route, operation) => return Ok(true),
                Some(_) => {}
                None => {
                    unknown.get_or_insert(role);
                }
            }
        }
        if let Some(role) = unknown {
            bail!("role '{role}' is not defined in the role table");
        }
        Ok(false)
    }
}

/// An authorizer that checks the caller's roles against the role table.
/// It never defers: a caller without a granting role is denied.
pub struct RuleAuthorizer {
    table: Arc<RoleTable>,
}

impl RuleAuthorizer {
    pub fn new(table: Arc<RoleTable>) -> Self {
        Self { table }
    }
}

impl Authorizer for RuleAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        if self
            .table
            .is_granted(&req.user.roles, req.route, req.operation)?
        {
            return Ok(AuthzResponse::Ok);
        }

        Ok(AuthzResponse::Unauthorized)
    }
}

/// Checks if any rule in the provided rules allows the operation on the route
pub fn is_authorized(rules: &[RoleRule], route: &str, operation: Operation) -> bool {
    for rule in rules.iter() {
        if !rule.resources.contains("*") && !rule.resources.contains(route) {
            continue;
        }
        if !rule.operations.contains("*") && !rule.operations.contains(operation.as_str()) {
            continue;
        }
        return true;
    }
    false
}
