pub mod config;
pub mod factory;
pub mod jwt;

use anyhow::Result;

/// A signed token and the number of seconds it stays valid.
#[derive(Debug, Clone)]
pub struct Token {
    pub token: String,
    pub expire_in: usize,
}

pub trait TokenGenerator {
    fn generate_token(&self, user: String) -> Result<Token>;
}

pub trait TokenValidator {
    /// Returns the user id the token was issued to.
    fn validate_token(&self, token: &str) -> Result<String>;
}
