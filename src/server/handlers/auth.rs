use std::sync::Arc;

use actix_web::HttpRequest;
use anyhow::Result;
use log::{error, info, warn};

use crate::server::authn::token::jwt::JwtTokenGenerator;
use crate::server::authn::token::TokenGenerator;
use crate::server::authz::config::{ROLE_ADMIN, ROLE_USER};
use crate::server::db::types::UserRecord;
use crate::server::db::Database;
use crate::server::error::ApiError;
use crate::server::resource::new_identifier;
use crate::server::response::Response;
use crate::time::current_timestamp;
use crate::types::token::TokenResponse;
use crate::types::user::{
    generate_salt, get_password_hash, SigninRequest, SignupRequest, MIN_PASSWORD_LENGTH,
};

use super::{parse_json_body, Handler};

pub const ADMIN_USERNAME: &str = "admin";

/// Handles `/api/auth/signup` and `/api/auth/signin`.
pub struct AuthHandler {
    allow_signup: bool,
    token_generator: JwtTokenGenerator,
    db: Arc<Database>,
}

impl AuthHandler {
    pub fn new(allow_signup: bool, token_generator: JwtTokenGenerator, db: Arc<Database>) -> Self {
        Self {
            allow_signup,
            token_generator,
            db,
        }
    }

    fn signup(&self, req: SignupRequest) -> Result<Response, ApiError> {
        if !self.allow_signup {
            return Err(ApiError::Forbidden(String::from("Signup is disabled")));
        }

        let username = req.username.trim();
        if username.is_empty() {
            return Err(ApiError::Validation(String::from("Please fill username")));
        }
        if req.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let display_name = match req.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => username.to_string(),
        };

        let salt = generate_salt();
        let user = UserRecord {
            id: new_identifier(),
            username: username.to_string(),
            display_name,
            password: get_password_hash(&req.password, &salt),
            salt,
            roles: vec![String::from(ROLE_USER)],
            create_time: current_timestamp(),
        };

        let created = self.db.with_transaction(|tx| {
            if tx.has_username(&user.username)? {
                return Ok(false);
            }
            tx.create_user(&user)?;
            Ok(true)
        });
        match created {
            Ok(true) => {}
            Ok(false) => {
                return Err(ApiError::Validation(String::from("Username already exists")))
            }
            Err(e) => {
                error!("Create user failed: {e:#}");
                return Err(ApiError::Database);
            }
        }

        info!("User '{}' signed up", user.username);
        self.issue_token(&user)
    }

    fn signin(&self, req: SigninRequest) -> Result<Response, ApiError> {
        let invalid = || ApiError::Unauthenticated(String::from("Invalid username or password"));

        let username = req.username.trim();
        if username.is_empty() || req.password.is_empty() {
            return Err(invalid());
        }

        let user = match self.db.with_transaction(|tx| tx.get_user_by_username(username)) {
            Ok(Some(user)) => user,
            Ok(None) => return Err(invalid()),
            Err(e) => {
                error!("Get user record for signin failed: {e:#}");
                return Err(ApiError::Database);
            }
        };

        if get_password_hash(&req.password, &user.salt) != user.password {
            warn!("Signin of user '{username}' rejected: wrong password");
            return Err(invalid());
        }

        self.issue_token(&user)
    }

    fn issue_token(&self, user: &UserRecord) -> Result<Response, ApiError> {
        let token = match self.token_generator.generate_token(user.id.clone()) {
            Ok(token) => token,
            Err(e) => {
                error!("Generate token failed: {e:#}");
                return Err(ApiError::Token);
            }
        };
        Ok(Response::json(TokenResponse {
            user: user.view(),
            token: token.token,
            expire_in: token.expire_in,
        }))
    }

    /// Creates the `admin` account on first start. An existing account is
    /// left untouched.
    pub fn ensure_admin(db: &Database, password: &str) -> Result<()> {
        let created = db.with_transaction(|tx| {
            if tx.has_username(ADMIN_USERNAME)? {
                return Ok(false);
            }
            let salt = generate_salt();
            tx.create_user(&UserRecord {
                id: new_identifier(),
                username: String::from(ADMIN_USERNAME),
                display_name: String::from("Administrator"),
                password: get_password_hash(password, &salt),
                salt,
                roles: vec![String::from(ROLE_ADMIN), String::from(ROLE_USER)],
                create_time: current_timestamp(),
            })?;
            Ok(true)
        })?;
        if created {
            info!("Admin account created");
        }
        Ok(())
    }
}

impl Handler for AuthHandler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        let result = match path {
            "signup" => parse_json_body(body).and_then(|r| self.signup(r)),
            "signin" => parse_json_body(body).and_then(|r| self.signin(r)),
            _ => Err(ApiError::NoRoute(format!(
                "{} {}",
                req.method(),
                req.uri().path()
            ))),
        };
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::authn::token::factory::TokenFactory;

    use super::*;

    #[test]
    fn test_ensure_admin() {
        let db = Database::new_test();
        AuthHandler::ensure_admin(&db, "secret-password").unwrap();
        AuthHandler::ensure_admin(&db, "other-password").unwrap();

        let admin = db
            .with_transaction(|tx| tx.get_user_by_username(ADMIN_USERNAME))
            .unwrap()
            .unwrap();
        assert_eq!(admin.roles, vec![String::from("admin"), String::from("user")]);
        assert_eq!(
            admin.password,
            get_password_hash("secret-password", &admin.salt)
        );
        assert_eq!(db.with_transaction(|tx| tx.count_users()).unwrap(), 1);
    }

    #[test]
    fn test_signup_validation() {
        let db = Arc::new(Database::new_test());
        let generator = TokenFactory::new_test().build_token_generator().unwrap();
        let handler = AuthHandler::new(true, generator, db);

        let signup = |username: &str, password: &str| SignupRequest {
            username: username.to_string(),
            password: password.to_string(),
            display_name: None,
        };

        let err = handler.signup(signup(" ", "123456")).unwrap_err();
        assert_eq!(err.to_string(), "Please fill username");

        let err = handler.signup(signup("alice", "12345")).unwrap_err();
        assert_eq!(err.to_string(), "Password should be at least 6 characters");

        handler.signup(signup(" alice ", "123456")).unwrap();
        let err = handler.signup(signup("alice", "abcdef")).unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");

        handler
            .signin(SigninRequest {
                username: String::from("alice"),
                password: String::from("123456"),
            })
            .unwrap();
        let err = handler
            .signin(SigninRequest {
                username: String::from("alice"),
                password: String::from("abcdef"),
            })
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 401);

        let generator = TokenFactory::new_test().build_token_generator().unwrap();
        let handler = AuthHandler::new(false, generator, Arc::new(Database::new_test()));
        let err = handler.signup(signup("bob", "123456")).unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }
}
