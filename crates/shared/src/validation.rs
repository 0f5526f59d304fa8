//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of a function name (Docker repository path component limit).
const MAX_FUNCTION_NAME_LENGTH: usize = 63;

lazy_static! {
    /// Docker repository path component: lowercase alphanumeric start,
    /// then lowercase alphanumerics, `-`, `_` and `.`.
    static ref FUNCTION_NAME_RE: Regex =
        Regex::new(r"^[a-z0-9][a-z0-9_.-]*$").expect("invalid function name regex");
}

/// Validates that a function name is usable as a Docker repository component.
pub fn validate_function_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        let mut err = ValidationError::new("function_name_empty");
        err.message = Some("Function name is required".into());
        return Err(err);
    }

    if name.len() > MAX_FUNCTION_NAME_LENGTH {
        let mut err = ValidationError::new("function_name_length");
        err.message = Some(
            format!("Function name must be at most {MAX_FUNCTION_NAME_LENGTH} characters").into(),
        );
        return Err(err);
    }

    if !FUNCTION_NAME_RE.is_match(name) {
        let mut err = ValidationError::new("function_name_format");
        err.message = Some(
            "Function name must start with a lowercase letter or digit and contain only \
             lowercase letters, digits, '-', '_' and '.'"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_function_names() {
        assert!(validate_function_name("hello").is_ok());
        assert!(validate_function_name("hello-world").is_ok());
        assert!(validate_function_name("api_v2").is_ok());
        assert!(validate_function_name("0day.scanner").is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = validate_function_name("").unwrap_err();
        assert_eq!(err.code, "function_name_empty");
    }

    #[test]
    fn test_uppercase_rejected() {
        let err = validate_function_name("Hello").unwrap_err();
        assert_eq!(err.code, "function_name_format");
    }

    #[test]
    fn test_leading_separator_rejected() {
        assert!(validate_function_name("-hello").is_err());
        assert!(validate_function_name(".hidden").is_err());
        assert!(validate_function_name("_private").is_err());
    }

    #[test]
    fn test_path_characters_rejected() {
        assert!(validate_function_name("a/b").is_err());
        assert!(validate_function_name("a:b").is_err());
        assert!(validate_function_name("a b").is_err());
    }

    #[test]
    fn test_max_length() {
        let at_limit = "a".repeat(MAX_FUNCTION_NAME_LENGTH);
        assert!(validate_function_name(&at_limit).is_ok());

        let over_limit = "a".repeat(MAX_FUNCTION_NAME_LENGTH + 1);
        let err = validate_function_name(&over_limit).unwrap_err();
        assert_eq!(err.code, "function_name_length");
    }
}
