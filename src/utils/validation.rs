//! Username validation utilities

use std::sync::OnceLock;
use regex::Regex;
use crate::utils::errors::UsernameError;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+$").expect("static username pattern"))
}

/// Lowercase letters and digits only, no spaces or symbols
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && username_pattern().is_match(username)
}

/// Check every username rule, reporting the first one broken
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    if username.trim().is_empty() {
        return Err(UsernameError::Empty);
    }

    let length = username.chars().count();
    if length < USERNAME_MIN_LEN {
        return Err(UsernameError::TooShort);
    }
    if length > USERNAME_MAX_LEN {
        return Err(UsernameError::TooLong);
    }

    if !is_valid_username(username) {
        return Err(UsernameError::InvalidCharacters);
    }

    Ok(())
}

/// Lowercase and strip all whitespace
pub fn normalize_username(username: &str) -> String {
    username
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_username_rules_in_order() {
        assert_eq!(validate_username(""), Err(UsernameError::Empty));
        assert_eq!(validate_username("   "), Err(UsernameError::Empty));
        assert_eq!(validate_username("ab"), Err(UsernameError::TooShort));
        assert_eq!(validate_username("a".repeat(21).as_str()), Err(UsernameError::TooLong));
        assert_eq!(validate_username("Budi"), Err(UsernameError::InvalidCharacters));
        assert_eq!(validate_username("budi santoso"), Err(UsernameError::InvalidCharacters));
        assert_eq!(validate_username("budi_01"), Err(UsernameError::InvalidCharacters));
        assert_eq!(validate_username("budi01"), Ok(()));
        assert_eq!(validate_username("a".repeat(20).as_str()), Ok(()));
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username(" Budi Santoso "), "budisantoso");
        assert_eq!(normalize_username("RT\t02"), "rt02");
    }

    proptest! {
        #[test]
        fn prop_valid_pattern_is_accepted(name in "[a-z0-9]{3,20}") {
            prop_assert!(validate_username(&name).is_ok());
        }

        #[test]
        fn prop_normalized_names_have_no_whitespace_or_uppercase(raw in "[A-Za-z0-9 ]{0,30}") {
            let normalized = normalize_username(&raw);
            prop_assert!(!normalized.chars().any(|c| c.is_whitespace() || c.is_uppercase()));
        }
    }
}
