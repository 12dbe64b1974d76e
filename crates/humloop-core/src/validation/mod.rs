//! Client-side validation rules.
//!
//! Every rule is a pure function returning a [`ValidationResult`]. Rules
//! accumulate every violation they find instead of stopping at the first one,
//! so forms can show all problems at once. The backend remains the authority;
//! these checks only gate obviously bad input before it is sent.
//!
//! # Module Structure
//!
//! - `result`: `Violation` and `ValidationResult`
//! - `rules`: the predicate functions and `UploadLimits`

mod result;
mod rules;

pub use result::{ValidationResult, Violation};
pub use rules::{
    DEFAULT_MAX_UPLOAD_BYTES, UploadLimits, validate_audio_file, validate_email,
    validate_password, validate_password_change, validate_post_title, validate_username,
};
