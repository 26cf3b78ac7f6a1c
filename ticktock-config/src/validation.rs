//! Custom validation functions for configuration.

use validator::ValidationError;

/// Linux truncates thread names beyond 15 bytes; NUL bytes are rejected by `std`.
pub fn validate_thread_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > 15 || name.contains('\0') {
        return Err(ValidationError::new("invalid_thread_name"));
    }
    Ok(())
}

/// Validate a `tracing` level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_name_bounds() {
        assert!(validate_thread_name("ticktock-timer").is_ok());
        assert!(validate_thread_name("").is_err());
        assert!(validate_thread_name("a-very-long-thread-name").is_err());
        assert!(validate_thread_name("bad\0name").is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("DEBUG").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }
}
