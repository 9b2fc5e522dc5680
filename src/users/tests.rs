//! Tests for users module

#[cfg(test)]
mod tests {
    use super::super::models::{ChangePasswordRequest, UpdateProfileRequest};
    use crate::common::Validator;

    #[test]
    fn test_update_profile_accepts_partial_payload() {
        let req = UpdateProfileRequest {
            username: None,
            bio: Some("I write about Rust.".to_string()),
            avatar: None,
        };
        assert!(req.validate(&req).is_valid);
    }

    #[test]
    fn test_update_profile_rejects_bad_fields() {
        let req = UpdateProfileRequest {
            username: Some("x".to_string()),
            bio: Some("b".repeat(1001)),
            avatar: Some("ftp://nope".to_string()),
        };
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_change_password_requires_matching_confirmation() {
        let req = ChangePasswordRequest {
            old_password: "oldoldold".to_string(),
            new_password: "newnewnew".to_string(),
            new_password2: "different".to_string(),
        };
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "new_password2");
    }

    #[test]
    fn test_change_password_rejects_short_password() {
        let req = ChangePasswordRequest {
            old_password: "oldoldold".to_string(),
            new_password: "short".to_string(),
            new_password2: "short".to_string(),
        };
        assert!(!req.validate(&req).is_valid);
    }
}
