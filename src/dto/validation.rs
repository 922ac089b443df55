//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a session identifier looks like a generated share code:
/// uppercase letters and digits only, at a sane length.
///
/// # Examples
///
/// ```ignore
/// validate_session_id("AB12CD") // Ok
/// validate_session_id("ab12cd") // Err - lowercase
/// validate_session_id("AB 2CD") // Err - whitespace
/// ```
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > 16 {
        let mut err = ValidationError::new("session_id_length");
        err.message =
            Some(format!("Session ID must be 1-16 characters (got {})", id.len()).into());
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        let mut err = ValidationError::new("session_id_format");
        err.message =
            Some("Session ID must contain only uppercase letters and digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_id_valid() {
        assert!(validate_session_id("AB12CD").is_ok());
        assert!(validate_session_id("ZZZZZZ").is_ok());
        assert!(validate_session_id("000000").is_ok());
    }

    #[test]
    fn test_validate_session_id_invalid_length() {
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("AB12CD0000AB12CD0").is_err()); // too long
    }

    #[test]
    fn test_validate_session_id_invalid_format() {
        assert!(validate_session_id("ab12cd").is_err()); // lowercase
        assert!(validate_session_id("AB 2CD").is_err()); // space
        assert!(validate_session_id("AB12C!").is_err()); // punctuation
    }
}
