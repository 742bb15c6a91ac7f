//! Password policy enforcement for new passwords.

use questhub_core::config::AuthConfig;
use questhub_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Minimum zxcvbn score (0-4).
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score.min(4),
        }
    }

    /// Validates a password against the configured policy.
    ///
    /// `user_inputs` (username, email, ...) are penalised by the strength
    /// estimator when they appear in the password.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if length > 128 {
            return Err(AppError::validation(
                "Password must be at most 128 characters long",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if (estimate.score() as u8) < self.min_score {
            return Err(AppError::validation(
                "Password is too weak. Please use a longer or less predictable password.",
            ));
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validator().validate("abc", &[]).unwrap_err();
        assert!(err.message.contains("at least"));
    }

    #[test]
    fn test_weak_password_rejected() {
        assert!(validator().validate("password", &[]).is_err());
        assert!(validator().validate("12345678", &[]).is_err());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validator().validate("Mango-Sticky-Rice-Chiang-Mai", &[]).is_ok());
    }

    #[test]
    fn test_same_password_rejected() {
        assert!(validator().validate_not_same("a", "a").is_err());
        assert!(validator().validate_not_same("a", "b").is_ok());
    }
}
