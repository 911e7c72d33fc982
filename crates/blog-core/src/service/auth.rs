//! Registration, login, and profile lookup.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::{DomainError, FieldError};
use crate::ports::{PasswordService, TokenService, UserRepository};

use super::{check_email_shape, check_required_string};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration input, confirmation included.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Authentication flows: register, login, profile.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Create a user with a one-way-hashed password and issue a token.
    pub async fn register(&self, input: Registration) -> Result<(User, String), DomainError> {
        let mut errors = Vec::new();
        check_required_string(&mut errors, "name", &input.name);
        check_email_shape(&mut errors, &input.email);
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
            ));
        }
        if input.password != input.password_confirmation {
            errors.push(FieldError::new(
                "password",
                "The password confirmation does not match.",
            ));
        }
        if errors.is_empty() && self.users.find_by_email(&input.email).await?.is_some() {
            errors.push(FieldError::new("email", "The email has already been taken."));
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(User::new(input.name, input.email, password_hash))
            .await?;

        let token = self
            .tokens
            .generate_token(user.id, &user.email)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok((user, token))
    }

    /// Verify credentials and issue a fresh token.
    ///
    /// Unknown email and wrong password both collapse into `Unauthorized`
    /// so the response cannot be used for account enumeration.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            return Err(DomainError::Unauthorized);
        }

        self.tokens
            .generate_token(user.id, &user.email)
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Resolve the authenticated identity back to the stored user.
    pub async fn profile(&self, user_id: Uuid) -> Result<User, DomainError> {
        // A valid token for a since-deleted user is no longer authorized.
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }
}
