/*
 * Responsibility
 * - 登録 / ログインの request/response DTO
 * - validate() は形式チェックのみ (資格情報の検証は service 側)
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::authentication::{IssuedToken, RegisterCommand};
use crate::services::auth::identity::Credentials;

const MAX_EMAIL_LEN: usize = 254;

fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("email is required");
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("email must be <= 254 chars");
    }
    if !email.contains('@') {
        return Err("email must contain '@'");
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.firstname.trim().is_empty() {
            return Err("firstname is required");
        }
        if self.lastname.trim().is_empty() {
            return Err("lastname is required");
        }
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(req: RegisterRequest) -> Self {
        Self {
            firstname: req.firstname,
            lastname: req.lastname,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

impl AuthenticateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

impl From<AuthenticateRequest> for Credentials {
    fn from(req: AuthenticateRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn register_request_validation() {
        assert!(register("a@x.com", "p1").validate().is_ok());
        assert!(register("", "p1").validate().is_err());
        assert!(register("ax.com", "p1").validate().is_err());
        assert!(register("a@x.com", "").validate().is_err());

        let mut nameless = register("a@x.com", "p1");
        nameless.firstname = "  ".into();
        assert!(nameless.validate().is_err());
    }

    #[test]
    fn authenticate_request_validation() {
        let ok = AuthenticateRequest {
            email: "a@x.com".into(),
            password: "p1".into(),
        };
        let long_email = AuthenticateRequest {
            email: format!("{}@x.com", "a".repeat(MAX_EMAIL_LEN)),
            password: "p1".into(),
        };

        assert!(ok.validate().is_ok());
        assert!(long_email.validate().is_err());
    }
}
