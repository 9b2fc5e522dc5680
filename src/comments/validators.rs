use super::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::common::{ValidationResult, Validator};

const MAX_COMMENT_LENGTH: usize = 2000;

impl Validator<CreateCommentRequest> for CreateCommentRequest {
    fn validate(&self, data: &CreateCommentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.body.trim().is_empty() {
            result.add_error("body", "Comment body is required");
        }
        if data.body.len() > MAX_COMMENT_LENGTH {
            result.add_error("body", "Comment must not exceed 2000 characters");
        }

        result
    }
}

impl Validator<UpdateCommentRequest> for UpdateCommentRequest {
    fn validate(&self, data: &UpdateCommentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.body.trim().is_empty() {
            result.add_error("body", "Comment body is required");
        }
        if data.body.len() > MAX_COMMENT_LENGTH {
            result.add_error("body", "Comment must not exceed 2000 characters");
        }

        result
    }
}
