//! Validation helpers for DTOs.

use time::{Date, macros::format_description};
use validator::ValidationError;

/// Longest identifier accepted from clients.
const MAX_ID_LEN: usize = 128;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a record identifier: non-blank, bounded, no whitespace or control characters.
pub fn validate_entity_id(id: &str) -> Result<(), ValidationError> {
    validate_not_blank(id)?;

    if id.len() > MAX_ID_LEN {
        let mut err = ValidationError::new("id_length");
        err.message = Some(format!("ID must be at most {MAX_ID_LEN} bytes (got {})", id.len()).into());
        return Err(err);
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        let mut err = ValidationError::new("id_format");
        err.message = Some("ID must not contain whitespace or control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates an air date written as `YYYY-MM-DD`.
pub fn validate_game_date(value: &str) -> Result<(), ValidationError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(|_| ())
        .map_err(|_| {
            let mut err = ValidationError::new("game_date_format");
            err.message = Some("game date must use the YYYY-MM-DD format".into());
            err
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Moscow").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_entity_id_valid() {
        assert!(validate_entity_id("g1").is_ok());
        assert!(validate_entity_id("4b7f5e0a-3c1d-4c0e-9a61-3f2b6f0c9d11").is_ok());
    }

    #[test]
    fn test_validate_entity_id_invalid() {
        assert!(validate_entity_id("").is_err());
        assert!(validate_entity_id("game 1").is_err()); // space
        assert!(validate_entity_id(&"x".repeat(129)).is_err()); // too long
    }

    #[test]
    fn test_validate_game_date() {
        assert!(validate_game_date("2024-12-31").is_ok());
        assert!(validate_game_date("2024-13-01").is_err());
        assert!(validate_game_date("31.12.2024").is_err());
    }
}
