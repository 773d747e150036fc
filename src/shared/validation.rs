use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for validating usernames stored on local user records.
    /// Mirrors the characters Keycloak accepts by default.
    /// - Valid: "john_doe", "jane.doe", "user-1", "ops@studio"
    /// - Invalid: "", "john doe", "john/doe"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.@-]{1,255}$").unwrap();
}

/// `validator` custom check: reject strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_regex_valid() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("jane.doe"));
        assert!(USERNAME_REGEX.is_match("user-1"));
        assert!(USERNAME_REGEX.is_match("ops@studio"));
    }

    #[test]
    fn test_username_regex_invalid() {
        assert!(!USERNAME_REGEX.is_match(""));
        assert!(!USERNAME_REGEX.is_match("john doe"));
        assert!(!USERNAME_REGEX.is_match("john/doe"));
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("clip").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
