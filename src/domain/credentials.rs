//! Input rules for registration and login.

use regex::Regex;
use std::sync::OnceLock;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(
        &RE,
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[A-Za-z0-9_]{3,20}$")
}

pub const EMAIL_MESSAGE: &str = "Invalid email format";
pub const USERNAME_MESSAGE: &str =
    "Username must be 3-20 characters long and contain only letters, numbers, and underscores";
pub const PASSWORD_MESSAGE: &str =
    "Password must be at least 8 characters long and contain uppercase, lowercase, and number";

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_regex().is_match(email)
}

#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

/// At least 8 characters with an upper-case letter, a lower-case letter and a digit.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("demo@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn test_username() {
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("demo_user"));
        assert!(is_valid_username("A1234567890123456789"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("A12345678901234567890"));
        assert!(!is_valid_username("bad-name"));
        assert!(!is_valid_username("has space"));
    }

    #[test]
    fn test_password_policy() {
        assert!(is_strong_password("Password1"));
        assert!(is_strong_password("Demo123!"));
        assert!(!is_strong_password("Pass1"));
        assert!(!is_strong_password("password1"));
        assert!(!is_strong_password("PASSWORD1"));
        assert!(!is_strong_password("Password"));
    }
}
