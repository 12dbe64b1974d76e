use super::result::{ValidationResult, Violation};
use crate::audio::AudioFileInfo;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default upload ceiling: 50 MiB, roughly a five minute recording.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

const PASSWORD_MIN_CHARS: usize = 8;
const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 20;

static USERNAME_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9가-힣_]+$").expect("username pattern is valid"));

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*(),.?":{}|<>"#;

/// Size ceiling applied to uploaded audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl UploadLimits {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    fn max_mib(&self) -> u64 {
        self.max_bytes / (1024 * 1024)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Checks that a file is audio and within the size ceiling.
///
/// Both violations can be reported for the same file.
pub fn validate_audio_file(file: &AudioFileInfo, limits: &UploadLimits) -> ValidationResult {
    let mut errors = Vec::new();

    if !file.mime_type.to_ascii_lowercase().starts_with("audio/") {
        errors.push(Violation::InvalidType);
    }

    if file.size_bytes > limits.max_bytes {
        errors.push(Violation::TooLarge {
            max_mib: limits.max_mib(),
        });
    }

    ValidationResult::from_violations(errors)
}

/// Password strength check. Reports every missing character class.
pub fn validate_password(value: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if value.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(Violation::TooShort);
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(Violation::MissingUpper);
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(Violation::MissingLower);
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        errors.push(Violation::MissingDigit);
    }
    if !value.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push(Violation::MissingSymbol);
    }

    ValidationResult::from_violations(errors)
}

pub fn validate_username(value: &str) -> ValidationResult {
    let mut errors = Vec::new();
    let length = value.chars().count();

    if length < USERNAME_MIN_CHARS {
        errors.push(Violation::UsernameTooShort);
    }
    if length > USERNAME_MAX_CHARS {
        errors.push(Violation::UsernameTooLong);
    }
    if !USERNAME_CHARSET.is_match(value) {
        errors.push(Violation::UsernameInvalidCharacters);
    }

    ValidationResult::from_violations(errors)
}

/// Structural `local@domain.tld` check, not an RFC 5322 validator.
pub fn validate_email(value: &str) -> ValidationResult {
    let errors = if EMAIL_SHAPE.is_match(value) {
        Vec::new()
    } else {
        vec![Violation::InvalidEmail]
    };
    ValidationResult::from_violations(errors)
}

pub fn validate_post_title(value: &str) -> ValidationResult {
    let errors = if value.trim().is_empty() {
        vec![Violation::EmptyTitle]
    } else {
        Vec::new()
    };
    ValidationResult::from_violations(errors)
}

/// Checks a password change form: the current password is present, the new
/// one passes [`validate_password`] and both new entries agree.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if current.is_empty() {
        errors.push(Violation::MissingCurrentPassword);
    }
    let result = ValidationResult::from_violations(errors).merge(validate_password(new));
    if new == confirm {
        result
    } else {
        result.merge(ValidationResult::from_violations(vec![Violation::PasswordMismatch]))
    }
}
