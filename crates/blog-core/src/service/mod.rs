//! Domain services - orchestrate repository calls behind the HTTP layer.
//!
//! Dependencies are passed explicitly at construction; the services know
//! nothing about actix or SeaORM, only the ports.

mod auth;
mod post;
mod tag;
mod user;

pub use auth::{AuthService, Registration};
pub use post::PostService;
pub use tag::TagService;
pub use user::UserService;

#[cfg(test)]
mod tests;

use crate::error::FieldError;

pub(crate) const MAX_STRING_LEN: usize = 255;

/// Push a field error when a required string is empty or too long.
pub(crate) fn check_required_string(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(
            field,
            format!("The {field} field is required."),
        ));
    } else if value.chars().count() > MAX_STRING_LEN {
        errors.push(FieldError::new(
            field,
            format!("The {field} may not be greater than {MAX_STRING_LEN} characters."),
        ));
    }
}

/// Minimal email shape check; real verification is out of scope.
pub(crate) fn check_email_shape(errors: &mut Vec<FieldError>, email: &str) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "The email field is required."));
    } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.push(FieldError::new(
            "email",
            "The email must be a valid email address.",
        ));
    }
}
