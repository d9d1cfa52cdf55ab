use anyhow::{bail, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::time::current_timestamp_secs;

use super::{Token, TokenGenerator, TokenValidator};

const ISSUER: &str = "tourism-catalog/jwt";

/// Registered claims (RFC 7519) carried by every token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
    pub iss: String,
    pub nbf: usize, // Not before
    pub sub: String, // User id
}

pub struct JwtTokenGenerator {
    key: EncodingKey,
    expiry: usize,
}

impl JwtTokenGenerator {
    pub fn new(private_key: &[u8], expiry: u64) -> Result<Self> {
        let key = match EncodingKey::from_rsa_pem(private_key) {
            Ok(key) => key,
            Err(e) => bail!("parse RSA private key for jwt token generation failed: {e}"),
        };
        Ok(Self {
            key,
            expiry: expiry as usize,
        })
    }
}

impl TokenGenerator for JwtTokenGenerator {
    fn generate_token(&self, user: String) -> Result<Token> {
        if user.is_empty() {
            bail!("cannot generate token for empty user");
        }
        let now = current_timestamp_secs() as usize;

        let claims = Claims {
            exp: now + self.expiry,
            iat: now,
            iss: String::from(ISSUER),
            nbf: now,
            sub: user,
        };

        match encode(&Header::new(Algorithm::RS256), &claims, &self.key) {
            Ok(token) => Ok(Token {
                token,
                expire_in: self.expiry,
            }),
            Err(e) => bail!("generate jwt token failed: {e}"),
        }
    }
}

pub struct JwtTokenValidator {
    key: DecodingKey,
}

impl JwtTokenValidator {
    pub fn new(public_key: &[u8]) -> Result<Self> {
        let key = match DecodingKey::from_rsa_pem(public_key) {
            Ok(key) => key,
            Err(e) => bail!("parse RSA public key for jwt token validation failed: {e}"),
        };
        Ok(Self { key })
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate_token(&self, token: &str) -> Result<String> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "nbf", "sub"]);
        // Time checks use our own clock below
        validation.validate_exp = false;
        validation.validate_nbf = false;

        let claims = match decode::<Claims>(token, &self.key, &validation) {
            Ok(data) => data.claims,
            Err(e) => bail!("validate jwt token failed: {e}"),
        };

        if claims.sub.is_empty() {
            bail!("validate jwt token failed: empty subject");
        }

        let now = current_timestamp_secs() as usize;
        if now >= claims.exp {
            bail!("validate jwt token failed: token expired");
        }

        if now < claims.nbf {
            bail!("validate jwt token failed: token not yet valid");
        }

        Ok(claims.sub)
    }
}
