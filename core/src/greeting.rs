//! Name validation and greeting construction.

use std::fmt;

use crate::errors::ValidationError;

/// Maximum number of characters in a name, counted after trimming.
pub const MAX_NAME_LENGTH: usize = 100;

/// Used when no name, or only whitespace, is provided.
pub const DEFAULT_NAME: &str = "world";

const ACCENTED_LETTERS: [char; 14] = [
    'á', 'é', 'í', 'ó', 'ú', 'Á', 'É', 'Í', 'Ó', 'Ú', 'ñ', 'Ñ', 'ü', 'Ü',
];

/// A trimmed, non-empty name that passed the length and character checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    /// Trims `raw` and validates it.
    ///
    /// Returns `Ok(None)` when nothing is left after trimming. The length check
    /// runs before the character check, so an over-long name is reported as
    /// [`ValidationError::TooLong`] whatever it contains.
    pub fn parse(raw: &str) -> Result<Option<Self>, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Ok(None);
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::TooLong);
        }

        if !trimmed.chars().all(is_accepted) {
            return Err(ValidationError::InvalidCharacters);
        }

        Ok(Some(Self(trimmed.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whitespace here is the ASCII set (space, tab, LF, FF, CR). Other Unicode
/// spaces are only tolerated at the edges, where trimming removes them.
fn is_accepted(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_ascii_whitespace()
        || c == '-'
        || c == '\''
        || ACCENTED_LETTERS.contains(&c)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting(String);

impl Greeting {
    pub fn for_name(name: Option<&Name>) -> Self {
        let name = name.map_or(DEFAULT_NAME, Name::as_str);
        Self(format!("Hello {name}!"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the greeting for a raw, untrusted name.
pub fn greet(raw_name: &str) -> Result<Greeting, ValidationError> {
    let name = Name::parse(raw_name)?;
    Ok(Greeting::for_name(name.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greet_with_valid_name() {
        assert_eq!(greet("Joe").unwrap().as_str(), "Hello Joe!");
        assert_eq!(greet("John Doe").unwrap().as_str(), "Hello John Doe!");
        assert_eq!(greet("Mary-Jane").unwrap().as_str(), "Hello Mary-Jane!");
        assert_eq!(greet("O'Brien").unwrap().as_str(), "Hello O'Brien!");
    }

    #[test]
    fn test_greet_with_international_characters() {
        assert_eq!(greet("José María").unwrap().as_str(), "Hello José María!");
        assert_eq!(greet("Ñuñoa Müller").unwrap().as_str(), "Hello Ñuñoa Müller!");
    }

    #[test]
    fn test_greet_defaults_to_world() {
        assert_eq!(greet("").unwrap().as_str(), "Hello world!");
        assert_eq!(greet("   ").unwrap().as_str(), "Hello world!");
        assert_eq!(greet("\t\n ").unwrap().as_str(), "Hello world!");
    }

    #[test]
    fn test_greet_trims_surrounding_whitespace() {
        assert_eq!(greet("  Joe \n").unwrap().as_str(), "Hello Joe!");
    }

    #[test]
    fn test_length_is_counted_in_characters() {
        // 100 two-byte characters is 200 bytes but still within the limit
        let name = "é".repeat(MAX_NAME_LENGTH);
        assert!(greet(&name).is_ok());

        let name = "é".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(greet(&name), Err(ValidationError::TooLong));
    }

    #[test]
    fn test_length_boundary() {
        assert!(greet(&"a".repeat(MAX_NAME_LENGTH)).is_ok());
        assert_eq!(
            greet(&"a".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::TooLong)
        );
        // surrounding whitespace does not count
        let padded = format!("  {}  ", "a".repeat(MAX_NAME_LENGTH));
        assert!(greet(&padded).is_ok());
    }

    #[test]
    fn test_too_long_wins_over_invalid_characters() {
        let name = "<".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(greet(&name), Err(ValidationError::TooLong));
    }

    #[test]
    fn test_rejected_characters() {
        for name in [
            "<script>alert('xss')</script>",
            "'; DROP TABLE users--",
            "John@Doe",
            "../../../etc/passwd",
            "J. R. R.",
            "O\u{2019}Brien",
            "Zoë",
            "Ana\u{a0}Lucía",
        ] {
            assert_eq!(
                greet(name),
                Err(ValidationError::InvalidCharacters),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_name_parse_absent() {
        assert_eq!(Name::parse(" ").unwrap(), None);
        let name = Name::parse(" Ana ").unwrap().unwrap();
        assert_eq!(name.as_str(), "Ana");
    }
}
