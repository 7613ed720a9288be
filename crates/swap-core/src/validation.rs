//! Input validation for user-entered fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Value too long.
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },
    /// Empty value where one is required.
    Empty(String),
    /// A list that needs at least one entry has none.
    NoEntries(String),
    /// A user id with characters outside the accepted set.
    InvalidUserId(String),
    /// Value outside the accepted range.
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidUserId(id) => write!(f, "Invalid user id: {:?}", id),
            ValidationError::NoEntries(field) => {
                write!(f, "select at least one entry for {}", field)
            }
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{} must be between {} and {} (got {})", field, min, max, actual),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for a profile bio.
pub const MAX_BIO_LENGTH: usize = 500;

/// Maximum allowed length for a single skill or availability slot.
pub const MAX_ENTRY_LENGTH: usize = 64;

/// Maximum allowed length for a chat message.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Maximum allowed length for a group name.
pub const MAX_GROUP_NAME_LENGTH: usize = 80;

/// Maximum allowed length for a study-session title.
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum allowed length for a user id.
pub const MAX_USER_ID_LENGTH: usize = 128;

/// Validate a user id issued by the identity provider.
///
/// Ids are ASCII letters, digits and `-`. Match keys join two ids with
/// `_`, so `_` is never part of an id.
pub fn validate_user_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Empty("user id".to_string()));
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "user id".to_string(),
            max: MAX_USER_ID_LENGTH,
            actual: id.len(),
        });
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidUserId(id.to_string()));
    }

    Ok(())
}

/// Validate an email address (basic format check).
///
/// Checks for exactly one `@`, a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must be dotted, without leading or trailing dots".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Validate required free text and return it trimmed.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(value.to_string())
}

/// Validate a list of short entries (skills, availability slots).
///
/// The list must have at least one entry and no entry may be too long.
pub fn validate_entries(field: &str, entries: &[String]) -> Result<(), ValidationError> {
    if entries.is_empty() {
        return Err(ValidationError::NoEntries(field.to_string()));
    }

    for entry in entries {
        let actual = entry.chars().count();
        if actual > MAX_ENTRY_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_ENTRY_LENGTH,
                actual,
            });
        }
    }

    Ok(())
}

/// Validate a feedback rating.
pub fn validate_rating(rating: i64) -> Result<(), ValidationError> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
            actual: rating,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("student@uni.edu").is_ok());
        assert!(validate_email("first.last@cs.uni.ac.uk").is_ok());
        assert!(validate_email(" student@uni.edu ").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_email("student.uni.edu"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b@uni.edu"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("@uni.edu"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("student@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("student@uni..edu"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("bio", "  hi  ", 10).unwrap(), "hi");
        assert!(matches!(
            require_text("bio", "   ", 10),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            require_text("bio", "abcdef", 3),
            Err(ValidationError::TooLong { actual: 6, .. })
        ));
    }

    #[test]
    fn test_validate_entries() {
        assert!(validate_entries("skills", &["Python".to_string()]).is_ok());
        assert!(matches!(
            validate_entries("skills", &[]),
            Err(ValidationError::NoEntries(_))
        ));
        assert!(matches!(
            validate_entries("skills", &["x".repeat(65)]),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("Xk9f2-abc").is_ok());
        assert!(matches!(validate_user_id(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_user_id("a_b"),
            Err(ValidationError::InvalidUserId(_))
        ));
        assert!(matches!(
            validate_user_id("amy bob"),
            Err(ValidationError::InvalidUserId(_))
        ));
        assert!(matches!(
            validate_user_id(&"a".repeat(129)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TooLong {
            field: "bio".to_string(),
            max: 500,
            actual: 600,
        };
        assert_eq!(err.to_string(), "bio is too long (600 chars, max 500)");

        let err = ValidationError::NoEntries("availability".to_string());
        assert_eq!(err.to_string(), "select at least one entry for availability");
    }
}
