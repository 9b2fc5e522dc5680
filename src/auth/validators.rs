use regex::Regex;

use super::models::{LoginRequest, RegisterRequest};
use crate::common::{ValidationResult, Validator};

fn is_valid_email(email: &str) -> bool {
    // Shape check only; deliverability is not our problem.
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

impl Validator<RegisterRequest> for RegisterRequest {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_valid_email(&data.email) {
            result.add_error("email", "must be a valid email address");
        }

        let username = data.username.trim();
        if username.len() < 3 || username.len() > 30 {
            result.add_error("username", "must be between 3 and 30 characters");
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            result.add_error(
                "username",
                "may only contain letters, digits, hyphens and underscores",
            );
        }

        if data.password.len() < 8 {
            result.add_error("password", "must be at least 8 characters");
        }

        if data.password != data.password2 {
            result.add_error("password2", "passwords do not match");
        }

        result
    }
}

impl Validator<LoginRequest> for LoginRequest {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "is required");
        }
        if data.password.is_empty() {
            result.add_error("password", "is required");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "writer_01".to_string(),
            email: "writer@example.com".to_string(),
            password: "longenough".to_string(),
            password2: "longenough".to_string(),
        }
    }

    #[test]
    fn test_valid_register_request() {
        let req = register_request();
        assert!(req.validate(&req).is_valid);
    }

    #[test]
    fn test_rejects_bad_email() {
        let mut req = register_request();
        req.email = "not-an-email".to_string();
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "email");
    }

    #[test]
    fn test_rejects_short_password_and_mismatch() {
        let mut req = register_request();
        req.password = "short".to_string();
        req.password2 = "different".to_string();
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_rejects_bad_username() {
        let mut req = register_request();
        req.username = "a b!".to_string();
        assert!(!req.validate(&req).is_valid);
    }
}
