//! Serial number rules for new items.
//!
//! A serial number is exactly [`SERIAL_NUMBER_LENGTH`] characters drawn from
//! `A-Z` and `0-9`. Checks run in a fixed order (presence, length, charset)
//! so the caller always sees the first rule that failed.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Required length of every serial number.
pub const SERIAL_NUMBER_LENGTH: usize = 18;

const SERIAL_NUMBER_PATTERN: &str = r"^[A-Z0-9]+$";

static SERIAL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SERIAL_NUMBER_PATTERN).expect("valid regex"));

pub const MSG_REQUIRED: &str = "Serial number is required";
pub const MSG_LENGTH: &str = "Serial number must be exactly 18 characters";
pub const MSG_CHARSET: &str =
    "Serial number must contain only uppercase letters (A-Z) and numbers (0-9)";

/// Validate a serial number supplied by the caller.
///
/// Length is counted in characters, not bytes, so a multi-byte string of 18
/// characters reaches the charset check rather than failing on length.
pub fn validate_serial_number(serial_number: &str) -> Result<(), CoreError> {
    if serial_number.is_empty() {
        return Err(CoreError::Validation(MSG_REQUIRED.to_string()));
    }
    if serial_number.chars().count() != SERIAL_NUMBER_LENGTH {
        return Err(CoreError::Validation(MSG_LENGTH.to_string()));
    }
    if !SERIAL_NUMBER_RE.is_match(serial_number) {
        return Err(CoreError::Validation(MSG_CHARSET.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
