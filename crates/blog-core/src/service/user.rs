//! User CRUD.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Post, User, UserPatch};
use crate::error::{DomainError, FieldError};
use crate::ports::{PasswordService, PostRepository, UserRepository};
use crate::service::auth::MIN_PASSWORD_LEN;

use super::{check_email_shape, check_required_string};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            posts,
            passwords,
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.find_all().await?)
    }

    /// A user together with the posts they own.
    pub async fn get(&self, id: Uuid) -> Result<(User, Vec<Post>), DomainError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "User",
                id,
            })?;
        let posts = self.posts.find_by_user_id(id).await?;
        Ok((user, posts))
    }

    /// Admin-style creation; the password is hashed before persisting.
    pub async fn create(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let mut errors = Vec::new();
        check_required_string(&mut errors, "name", &name);
        check_email_shape(&mut errors, &email);
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
            ));
        }
        if errors.is_empty() && self.users.find_by_email(&email).await?.is_some() {
            errors.push(FieldError::new("email", "The email has already been taken."));
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let password_hash = self
            .passwords
            .hash(&password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(self
            .users
            .create(User::new(name, email, password_hash))
            .await?)
    }

    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "User",
                id,
            })?;

        let mut errors = Vec::new();
        if let Some(name) = &patch.name {
            check_required_string(&mut errors, "name", name);
        }
        if let Some(email) = &patch.email {
            check_email_shape(&mut errors, email);
            // Uniqueness check excludes the user being updated.
            if errors.is_empty()
                && let Some(existing) = self.users.find_by_email(email).await?
                && existing.id != id
            {
                errors.push(FieldError::new("email", "The email has already been taken."));
            }
        }
        if let Some(password) = &patch.password
            && password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.push(FieldError::new(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
            ));
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password) = patch.password {
            user.password_hash = self
                .passwords
                .hash(&password)
                .map_err(|e| DomainError::Internal(e.to_string()))?;
        }
        user.updated_at = Utc::now();

        Ok(self.users.update(user).await?)
    }

    /// Delete a user; their posts cascade at the datastore level.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity_type: "User",
                id,
            });
        }
        self.users.delete(id).await?;
        Ok(())
    }
}
