use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

use super::token::config::TokenConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthnConfig {
    /// Requests without credentials act as a guest. When disabled they are
    /// rejected with 401.
    #[serde(default = "AuthnConfig::default_allow_anonymous")]
    pub allow_anonymous: bool,

    #[serde(default = "AuthnConfig::default_allow_signup")]
    pub allow_signup: bool,

    /// When set, an `admin` account with this password is ensured at startup.
    #[serde(default = "AuthnConfig::default_admin_password")]
    pub admin_password: String,

    #[serde(default = "TokenConfig::default")]
    pub token: TokenConfig,
}

impl CommonConfig for AuthnConfig {
    fn default() -> Self {
        Self {
            allow_anonymous: Self::default_allow_anonymous(),
            allow_signup: Self::default_allow_signup(),
            admin_password: Self::default_admin_password(),
            token: TokenConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.admin_password = expandenv("admin_password", &self.admin_password)?;
        self.token.complete(ps).context("token")?;
        Ok(())
    }
}

impl AuthnConfig {
    pub fn default_allow_anonymous() -> bool {
        true
    }

    pub fn default_allow_signup() -> bool {
        true
    }

    pub fn default_admin_password() -> String {
        String::new()
    }
}
