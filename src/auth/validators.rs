use super::models::{LoginRequest, RegisterRequest};
use crate::common::{ValidationResult, Validator};

/// bcrypt only looks at the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MAX_USERNAME_BYTES: usize = 64;
pub const MAX_EMAIL_BYTES: usize = 254;

impl Validator for RegisterRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result
            .require("username", &self.username)
            .max_len("username", &self.username, MAX_USERNAME_BYTES)
            .require("email", &self.email)
            .max_len("email", &self.email, MAX_EMAIL_BYTES)
            .require("password", &self.password)
            .max_len("password", &self.password, MAX_PASSWORD_BYTES);

        if self.username.chars().any(char::is_whitespace) {
            result.add_error("username", "must not contain whitespace");
        }

        let email = self.email.trim();
        if !email.is_empty() {
            let well_formed = email
                .split_once('@')
                .map_or(false, |(local, domain)| {
                    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                });
            if !well_formed {
                result.add_error("email", "must be a valid email address");
            }
        }

        result
    }
}

impl Validator for LoginRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result
            .require("username", &self.username)
            .require("password", &self.password)
            .max_len("password", &self.password, MAX_PASSWORD_BYTES);
        result
    }
}
