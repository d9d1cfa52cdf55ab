use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};
use crate::server::resource::KINDS;

use super::Operation;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_GUEST: &str = "guest";

/// Grants `operations` on every route pattern in `resources`. `*` in either
/// set matches everything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleRule {
    pub resources: HashSet<String>,
    pub operations: HashSet<String>,
}

/// Authorization related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthzConfig {
    /// Role name to the rules the role grants. When empty, the built-in
    /// admin/user/guest table is used.
    #[serde(default = "AuthzConfig::default_roles")]
    pub roles: HashMap<String, Vec<RoleRule>>,
}

impl CommonConfig for AuthzConfig {
    fn default() -> Self {
        Self {
            roles: Self::default_roles(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        if self.roles.is_empty() {
            self.roles = builtin_roles();
            return Ok(());
        }

        for name in [ROLE_ADMIN, ROLE_USER, ROLE_GUEST] {
            if !self.roles.contains_key(name) {
                bail!("role '{name}' must be defined");
            }
        }

        for (name, rules) in self.roles.iter() {
            validate_rules(rules).with_context(|| format!("role '{name}'"))?;
        }

        Ok(())
    }
}

impl AuthzConfig {
    pub fn default_roles() -> HashMap<String, Vec<RoleRule>> {
        HashMap::new()
    }
}

fn validate_rules(rules: &[RoleRule]) -> Result<()> {
    for rule in rules.iter() {
        if rule.resources.is_empty() {
            bail!("resources cannot be empty");
        }
        if rule.operations.is_empty() {
            bail!("operations cannot be empty");
        }
        for operation in rule.operations.iter() {
            if operation == "*" {
                continue;
            }
            operation.parse::<Operation>()?;
        }
    }
    Ok(())
}

fn rule(resources: &[String], operations: &[&str]) -> RoleRule {
    RoleRule {
        resources: resources.iter().cloned().collect(),
        operations: operations.iter().map(|s| s.to_string()).collect(),
    }
}

/// The default table: admins may do anything, users may create and list
/// collections and read items, guests may only list and read.
pub fn builtin_roles() -> HashMap<String, Vec<RoleRule>> {
    let collections: Vec<String> = KINDS.iter().map(|k| k.collection_route()).collect();
    let items: Vec<String> = KINDS.iter().map(|k| k.item_route()).collect();
    let all: Vec<String> = collections.iter().chain(items.iter()).cloned().collect();

    let mut roles = HashMap::new();
    roles.insert(String::from(ROLE_ADMIN), vec![rule(&all, &["*"])]);
    roles.insert(
        String::from(ROLE_USER),
        vec![
            rule(&collections, &["create", "list"]),
            rule(&items, &["read"]),
        ],
    );
    roles.insert(
        String::from(ROLE_GUEST),
        vec![rule(&collections, &["list"]), rule(&items, &["read"])],
    );
    roles
}
