//! Email format validation for the signup surface.
//!
//! The engine treats a malformed email as a caller bug, so the check lives
//! here at the boundary. The pattern only rejects obvious junk (whitespace,
//! missing `@` or domain dot); deliverability is not our problem.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid");
}

/// Returns true if `input` looks like an email address.
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
    }

    #[test]
    fn rejects_missing_parts() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("name@nodot"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn rejects_whitespace() {
        assert!(!is_valid_email("name @example.com"));
        assert!(!is_valid_email("name@exa mple.com"));
    }
}
