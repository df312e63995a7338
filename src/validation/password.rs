//! Password format validation.
//!
//! The same rule applies at every site a password is collected:
//! - Minimum length of 8 characters
//! - At least one lowercase letter, one uppercase letter, one digit
//! - At least one symbol from `@$!%*#?&`
//! - No character outside `[A-Za-z0-9@$!%*#?&]`

use once_cell::sync::Lazy;
use regex::Regex;

// Constants for password requirements
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const PASSWORD_SYMBOLS: &str = "@$!%*#?&";

/// Human readable form of the rule, used in warnings.
pub const PASSWORD_RULE_MESSAGE: &str = "The password must contain at least 8 characters, one uppercase letter, one lowercase letter, one number and one special character (@$!%*#?&)!";

static PASSWORD_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@$!%*#?&]{8,}$").expect("valid password regex"));

/// Validates a password against the format rule
///
/// Returns true if the password meets all requirements, false otherwise
pub fn is_password_format_valid(password: &str) -> bool {
    password_format_details(password).is_valid()
}

/// Get detailed validation results for a password
pub fn password_format_details(password: &str) -> PasswordFormatDetails {
    PasswordFormatDetails {
        meets_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        has_lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        has_digit: password.chars().any(|c| c.is_ascii_digit()),
        has_symbol: password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)),
        allowed_charset: PASSWORD_CHARSET.is_match(password),
    }
}

/// Detailed password validation results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordFormatDetails {
    pub meets_length: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_digit: bool,
    pub has_symbol: bool,
    pub allowed_charset: bool,
}

impl PasswordFormatDetails {
    /// Check if all requirements are met
    pub fn is_valid(&self) -> bool {
        self.meets_length
            && self.has_uppercase
            && self.has_lowercase
            && self.has_digit
            && self.has_symbol
            && self.allowed_charset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(is_password_format_valid("Test1234!"));
        assert!(is_password_format_valid("aB3@aB3@"));
    }

    #[test]
    fn test_short_password() {
        assert!(!is_password_format_valid("Abc1!"));
        assert!(!is_password_format_valid("aB3@aB3"));
    }

    #[test]
    fn test_password_without_uppercase() {
        assert!(!is_password_format_valid("test1234!"));
    }

    #[test]
    fn test_password_without_lowercase() {
        assert!(!is_password_format_valid("TEST1234!"));
    }

    #[test]
    fn test_password_without_digit() {
        assert!(!is_password_format_valid("TestTest!"));
    }

    #[test]
    fn test_password_without_symbol() {
        assert!(!is_password_format_valid("Test1234"));
    }

    #[test]
    fn test_symbol_outside_allowed_set() {
        // '-' is not one of the accepted symbols, even alongside a valid one
        assert!(!is_password_format_valid("Test-1234"));
        assert!(!is_password_format_valid("Test-1234!"));
        assert!(!is_password_format_valid("Test 1234!"));
        assert!(!is_password_format_valid("Tést1234!"));
    }

    #[test]
    fn test_empty_password() {
        assert!(!is_password_format_valid(""));
    }

    #[test]
    fn test_validation_details() {
        let details = password_format_details("Test1234!");
        assert!(details.meets_length);
        assert!(details.has_uppercase);
        assert!(details.has_lowercase);
        assert!(details.has_digit);
        assert!(details.has_symbol);
        assert!(details.allowed_charset);
        assert!(details.is_valid());

        let details = password_format_details("test");
        assert!(!details.meets_length);
        assert!(!details.has_uppercase);
        assert!(details.has_lowercase);
        assert!(!details.is_valid());
    }

    #[test]
    fn test_repeated_calls_agree() {
        for candidate in ["Test1234!", "nope", "Test-1234!"] {
            assert_eq!(is_password_format_valid(candidate), is_password_format_valid(candidate));
        }
    }
}
