//! Input validation utilities

use common::models::MAX_TOTAL_POINTS;
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_NICKNAME_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.chars().count() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes and underscores"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate the nickname given to a submission
pub fn validate_nickname(nickname: &str) -> Result<(), String> {
    if nickname.is_empty() {
        return Err("Nickname is required".to_string());
    }

    if nickname.chars().count() > MAX_NICKNAME_LEN {
        return Err(format!(
            "Nickname must be at most {} characters long",
            MAX_NICKNAME_LEN
        ));
    }

    Ok(())
}

/// Validate the optional free-text description of a submission
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "Description must be at most {} characters long",
            MAX_DESCRIPTION_LEN
        ));
    }

    Ok(())
}

/// Validate a balance set by an admin
pub fn validate_points(points: i64) -> Result<(), String> {
    if points < 0 {
        return Err("Points cannot be negative".to_string());
    }

    if points > MAX_TOTAL_POINTS {
        return Err(format!("Points must be at most {}", MAX_TOTAL_POINTS));
    }

    Ok(())
}
