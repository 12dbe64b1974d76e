use crate::error::HumloopError;
use thiserror::Error;

/// A single broken rule.
///
/// The `Display` text is the message shown next to the offending field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    #[error("Unsupported file type; only audio files can be uploaded.")]
    InvalidType,
    #[error("The file is too large; uploads are limited to {max_mib} MB.")]
    TooLarge { max_mib: u64 },
    #[error("Password must be at least 8 characters long.")]
    TooShort,
    #[error("Password must contain an uppercase letter.")]
    MissingUpper,
    #[error("Password must contain a lowercase letter.")]
    MissingLower,
    #[error("Password must contain a digit.")]
    MissingDigit,
    #[error("Password must contain a special character.")]
    MissingSymbol,
    #[error("Username must be at least 3 characters long.")]
    UsernameTooShort,
    #[error("Username must be at most 20 characters long.")]
    UsernameTooLong,
    #[error("Username may only contain letters, digits, Hangul and underscores.")]
    UsernameInvalidCharacters,
    #[error("Email address is not in a valid format.")]
    InvalidEmail,
    #[error("Title must not be empty.")]
    EmptyTitle,
    #[error("Current password is required.")]
    MissingCurrentPassword,
    #[error("New passwords do not match.")]
    PasswordMismatch,
}

/// Outcome of one validation call. Never mutated after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<Violation>,
}

impl ValidationResult {
    pub(crate) fn from_violations(errors: Vec<Violation>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations in the order the rules were evaluated.
    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    pub fn contains(&self, violation: Violation) -> bool {
        self.errors.contains(&violation)
    }

    /// Human-readable messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Converts a failed result into a `HumloopError::Validation`.
    ///
    /// Returns `Ok(())` when the result is valid.
    pub fn into_result(self) -> Result<(), HumloopError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(HumloopError::Validation(self.messages()))
        }
    }

    /// Concatenates two results, keeping the order of both.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self
    }
}
