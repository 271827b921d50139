//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates a room code: 1 to 64 characters, lowercase letters, digits,
/// dashes, and underscores.
///
/// Room codes appear in URLs and QR codes, so the accepted alphabet is kept
/// deliberately narrow.
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > 64 {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some(format!("Room code must be 1-64 characters (got {})", code.len()).into());
        return Err(err);
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some(
            "Room code must contain only lowercase letters, digits, dashes, and underscores"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a team color: `#` followed by exactly six hex digits.
pub fn validate_team_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        let mut err = ValidationError::new("team_color_format");
        err.message = Some("Color must be `#` followed by six hex digits".into());
        return Err(err);
    }

    Ok(())
}
