mod owner;
mod rule;
mod union;

pub mod chain;
pub mod config;
pub mod factory;

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{bail, Result};

use super::authn::AuthnUserInfo;

pub trait Authorizer: Send + Sync {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "create" => Operation::Create,
            "read" => Operation::Read,
            "update" => Operation::Update,
            "delete" => Operation::Delete,
            "list" => Operation::List,
            _ => bail!("unknown operation '{s}'"),
        })
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AuthzRequest<'a> {
    /// Route pattern, e.g. `/api/cities` or `/api/cities/:cityId`.
    pub route: &'a str,
    pub operation: Operation,
    pub user: &'a AuthnUserInfo,
    /// Owner of the resolved entity, for item routes.
    pub owner: Option<&'a str>,
}

/// Possible responses from an authorization check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthzResponse {
    /// Access is granted
    Ok,
    /// Defers decision to next authorizer in chain
    Continue,
    /// Access is denied
    Unauthorized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation() {
        for op in [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::List,
        ] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
            assert_eq!(op.to_string(), op.as_str());
        }
        assert!("write".parse::<Operation>().is_err());
        assert!("*".parse::<Operation>().is_err());
    }
}
