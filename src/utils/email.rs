use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

/// Rate limits and user lookups are keyed by this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes and validates in one step.
pub fn validate_email(email: &str) -> AppResult<String> {
    let normalized = normalize_email(email);
    if normalized.len() > 320 || !email_regex().is_match(&normalized) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.ORG "), "ada@example.org");
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" Grace@Example.com").unwrap(),
            "grace@example.com"
        );
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("").is_err());
    }
}
