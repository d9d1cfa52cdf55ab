use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::info;

use crate::rsa::generate_rsa_keys;

use super::config::TokenConfig;
use super::jwt::{JwtTokenGenerator, JwtTokenValidator};

pub struct TokenFactory {
    public_key: Vec<u8>,
    private_key: Vec<u8>,
    expiry: u64,
}

impl TokenFactory {
    pub fn new(cfg: &TokenConfig) -> Result<Self> {
        let (public_key, private_key) = match fs::read(&cfg.public_key_path) {
            Ok(data) => (data, None),
            Err(err) if err.kind() == io::ErrorKind::NotFound && cfg.generate_if_not_exists => {
                info!("Public key and private key for token not found, generating with rsa");
                let (public_key, private_key) = generate_rsa_keys()?;
                fs::write(&cfg.public_key_path, &public_key)
                    .context("write token public key")?;
                fs::write(&cfg.private_key_path, &private_key)
                    .context("write token private key")?;
                (public_key, Some(private_key))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                bail!("token public key '{}' not found", cfg.public_key_path)
            }
            Err(err) => return Err(err).context("read token public key failed"),
        };

        let private_key = match private_key {
            Some(key) => key,
            None => fs::read(&cfg.private_key_path).context("read token private key failed")?,
        };

        Ok(Self::from_keys(public_key, private_key, cfg.expiry))
    }

    pub fn from_keys(public_key: Vec<u8>, private_key: Vec<u8>, expiry: u64) -> Self {
        Self {
            public_key,
            private_key,
            expiry,
        }
    }

    pub fn build_token_generator(&self) -> Result<JwtTokenGenerator> {
        JwtTokenGenerator::new(&self.private_key, self.expiry)
    }

    pub fn build_token_validator(&self) -> Result<JwtTokenValidator> {
        JwtTokenValidator::new(&self.public_key)
    }
}

#[cfg(test)]
static TEST_KEYS: once_cell::sync::Lazy<(Vec<u8>, Vec<u8>)> =
    once_cell::sync::Lazy::new(|| generate_rsa_keys().unwrap());

#[cfg(test)]
impl TokenFactory {
    pub const TEST_EXPIRY: u64 = 3600;

    /// Shares one generated key pair across tests.
    pub fn new_test() -> Self {
        Self::new_test_with_expiry(Self::TEST_EXPIRY)
    }

    pub fn new_test_with_expiry(expiry: u64) -> Self {
        let (public_key, private_key) = (*TEST_KEYS).clone();
        Self::from_keys(public_key, private_key, expiry)
    }

    /// A factory with a fresh key pair of its own.
    pub fn new_test_unique() -> Self {
        let (public_key, private_key) = generate_rsa_keys().unwrap();
        Self::from_keys(public_key, private_key, Self::TEST_EXPIRY)
    }
}
