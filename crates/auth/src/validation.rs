//! Input validation for registration payloads.

use regex::Regex;

use crate::AuthError;

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;

/// Usernames are 1 to 150 characters of letters, digits and `@.+-_`.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::Validation("username may not be blank".to_string()));
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthError::Validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }

    let username_regex = Regex::new(r"^[\w.@+-]+$")
        .map_err(|_| AuthError::Validation("invalid username regex".to_string()))?;

    if !username_regex.is_match(username) {
        return Err(AuthError::Validation(
            "username may only contain letters, numbers, and @/./+/-/_ characters".to_string(),
        ));
    }

    Ok(())
}

/// Email is optional; a non-empty value must look like an address.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Ok(());
    }

    let email_regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|_| AuthError::Validation("invalid email regex".to_string()))?;

    if email.len() > MAX_EMAIL_LEN || !email_regex.is_match(email) {
        return Err(AuthError::Validation("enter a valid email address".to_string()));
    }

    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("password may not be blank".to_string()));
    }

    if password.chars().count() < min_length {
        return Err(AuthError::Validation(format!(
            "password must be at least {min_length} characters"
        )));
    }

    Ok(())
}
