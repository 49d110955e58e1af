use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Runs of whitespace, collapsed to `_` when normalizing category tags
    /// - "Upazila Health Complex" -> "upazila_health_complex"
    pub static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();

    /// Clock time in 24h "HH:MM" form, used for availability hours
    /// - Valid: "09:00", "17:30", "23:59"
    /// - Invalid: "9:00", "24:00", "12:60", "noon"
    pub static ref HOUR_MINUTE_REGEX: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

/// Reject strings that are empty once trimmed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::from("must not be blank"));
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_regex_collapses_runs() {
        assert_eq!(
            WHITESPACE_REGEX.replace_all("union  health\tcenter", "_"),
            "union_health_center"
        );
    }

    #[test]
    fn test_hour_minute_regex() {
        assert!(HOUR_MINUTE_REGEX.is_match("09:00"));
        assert!(HOUR_MINUTE_REGEX.is_match("23:59"));
        assert!(!HOUR_MINUTE_REGEX.is_match("9:00"));
        assert!(!HOUR_MINUTE_REGEX.is_match("24:00"));
        assert!(!HOUR_MINUTE_REGEX.is_match("12:60"));
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("neurologist").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
