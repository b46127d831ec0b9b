//! Shortname shape rules shared by user and chat mentions.
//!
//! A shortname is 4-32 characters of lowercase ASCII letters, digits and
//! underscores, and starts with a letter. The function plugs into
//! `#[validate(custom(function = "validate_shortname"))]`.

use std::borrow::Cow;

use validator::ValidationError;

pub const SHORTNAME_MIN_LEN: usize = 4;
pub const SHORTNAME_MAX_LEN: usize = 32;

/// Check the shape of a proposed shortname
pub fn validate_shortname(value: &str) -> Result<(), ValidationError> {
    if !(SHORTNAME_MIN_LEN..=SHORTNAME_MAX_LEN).contains(&value.len()) {
        return Err(invalid(
            "shortname_length",
            "Shortname must be 4-32 characters",
        ));
    }

    if !value.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(invalid(
            "shortname_start",
            "Shortname must start with a lowercase letter",
        ));
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_';
    if !value.chars().all(allowed) {
        return Err(invalid(
            "shortname_charset",
            "Shortname may only contain lowercase letters, digits and underscores",
        ));
    }

    Ok(())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
