//! Input validation helpers
//!
//! Centralized text length limits and validation functions for intake
//! input. Limits are UX-driven; the storage layer does not enforce text
//! lengths on its own.

use crate::orders::error::OrderError;

// ── Text length limits ──────────────────────────────────────────────

/// Notes and comments (order notes, rating comments)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, directory keys
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::Validation(format!(
            "missing required field: {field}"
        )));
    }
    if value.len() > max_len {
        return Err(OrderError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that a possibly-empty string stays within the length limit.
pub fn validate_optional_len(value: &str, field: &str, max_len: usize) -> Result<(), OrderError> {
    if value.len() > max_len {
        return Err(OrderError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_empty_and_whitespace() {
        assert!(validate_required_text("s1", "store_id", 100).is_ok());
        assert!(validate_required_text("", "store_id", 100).is_err());
        assert!(validate_required_text("   ", "store_id", 100).is_err());
    }

    #[test]
    fn required_text_names_the_field() {
        let err = validate_required_text("", "phone_number", 100).unwrap_err();
        match err {
            OrderError::Validation(msg) => assert!(msg.contains("phone_number")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn length_limits_are_enforced() {
        let long = "x".repeat(501);
        assert!(validate_optional_len(&long, "notes", MAX_NOTE_LEN).is_err());
        assert!(validate_optional_len("", "notes", MAX_NOTE_LEN).is_ok());
    }
}
