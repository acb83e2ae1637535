//! Form validation for the sign-in and sign-up screens.
//!
//! Validators collect every failure instead of stopping at the first one,
//! so a form can mark all offending fields in a single pass. `field_map`
//! flattens the ordered failure list into a per-field lookup for rendering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 6;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path as named in the form, e.g. `email`.
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Ordered collection of field failures from one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Flatten into a per-field message map. See [`field_map`].
    pub fn field_map(&self) -> HashMap<String, String> {
        field_map(&self.0)
    }
}

/// Flatten an ordered sequence of field failures into path -> message.
///
/// When several failures share a path the later one wins; forms render one
/// message per field, so earlier messages are overwritten rather than
/// aggregated.
pub fn field_map(errors: &[FieldError]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for err in errors {
        map.insert(err.path.clone(), err.message.clone());
    }
    map
}

/// Sign-in form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validate a sign-in form: email required and well-formed, password required.
pub fn validate_sign_in(form: &SignInForm) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if form.email.trim().is_empty() {
        errors.push(FieldError::new("email", "E-mail is required"));
    } else if !looks_like_email(&form.email) {
        errors.push(FieldError::new("email", "Enter a valid e-mail"));
    }

    if form.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Validate a sign-up form: name required, email required and well-formed,
/// password at least six characters.
pub fn validate_sign_up(form: &SignUpForm) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    if form.email.trim().is_empty() {
        errors.push(FieldError::new("email", "E-mail is required"));
    } else if !looks_like_email(&form.email) {
        errors.push(FieldError::new("email", "Enter a valid e-mail"));
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Check that a string has the shape of an email address:
/// non-empty local part, one `@`, and a domain containing a dot.
fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if s.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
