use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigninRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(rename = "displayName")]
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,

    #[serde(rename = "displayName")]
    pub display_name: String,

    pub roles: Vec<String>,
}

const SALT_LENGTH: usize = 30;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

pub fn get_password_hash(password: &str, salt: &str) -> String {
    let combined = format!("{password}{salt}");
    let hash = Sha256::digest(combined.as_bytes());
    format!("{:x}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(salt, generate_salt());

        let hash = get_password_hash("secret1", &salt);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, get_password_hash("secret1", &salt));
        assert_ne!(hash, get_password_hash("secret2", &salt));

        assert_eq!(
            get_password_hash("abc", ""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
