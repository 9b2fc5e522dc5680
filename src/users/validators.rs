use super::models::{ChangePasswordRequest, UpdateProfileRequest};
use crate::common::{ValidationResult, Validator};

impl Validator<UpdateProfileRequest> for UpdateProfileRequest {
    fn validate(&self, data: &UpdateProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(username) = &data.username {
            let username = username.trim();
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
        }

        if let Some(bio) = &data.bio {
            if bio.len() > 1000 {
                result.add_error("bio", "must not exceed 1000 characters");
            }
        }

        if let Some(avatar) = &data.avatar {
            if !avatar.is_empty()
                && !avatar.starts_with("http://")
                && !avatar.starts_with("https://")
            {
                result.add_error("avatar", "must be an http(s) URL");
            }
        }

        result
    }
}

impl Validator<ChangePasswordRequest> for ChangePasswordRequest {
    fn validate(&self, data: &ChangePasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.new_password.len() < 8 {
            result.add_error("new_password", "must be at least 8 characters");
        }
        if data.new_password != data.new_password2 {
            result.add_error("new_password2", "new passwords do not match");
        }

        result
    }
}
