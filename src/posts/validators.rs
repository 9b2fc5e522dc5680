use super::models::{
    is_valid_status, CreateCategoryRequest, CreatePostRequest, CreateTagRequest, UpdatePostRequest,
};
use crate::common::{ValidationResult, Validator};

impl Validator<CreatePostRequest> for CreatePostRequest {
    fn validate(&self, data: &CreatePostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Title is required");
        }
        if data.title.len() > 255 {
            result.add_error("title", "Title must not exceed 255 characters");
        }
        if data.content.trim().is_empty() {
            result.add_error("content", "Content is required");
        }
        if let Some(status) = &data.status {
            if !is_valid_status(status) {
                result.add_error("status", "Status must be 'draft', 'published' or 'archived'");
            }
        }
        if let Some(cover) = &data.cover_image {
            if !cover.is_empty() && !cover.starts_with("http://") && !cover.starts_with("https://")
            {
                result.add_error("cover_image", "Cover image must be an http(s) URL");
            }
        }

        result
    }
}

impl Validator<UpdatePostRequest> for UpdatePostRequest {
    fn validate(&self, data: &UpdatePostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                result.add_error("title", "Title must not be empty");
            }
            if title.len() > 255 {
                result.add_error("title", "Title must not exceed 255 characters");
            }
        }
        if let Some(content) = &data.content {
            if content.trim().is_empty() {
                result.add_error("content", "Content must not be empty");
            }
        }
        if let Some(status) = &data.status {
            if !is_valid_status(status) {
                result.add_error("status", "Status must be 'draft', 'published' or 'archived'");
            }
        }

        result
    }
}

impl Validator<CreateCategoryRequest> for CreateCategoryRequest {
    fn validate(&self, data: &CreateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Category name is required");
        }
        if data.name.len() > 100 {
            result.add_error("name", "Category name must not exceed 100 characters");
        }

        result
    }
}

impl Validator<CreateTagRequest> for CreateTagRequest {
    fn validate(&self, data: &CreateTagRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Tag name is required");
        }
        if data.name.len() > 50 {
            result.add_error("name", "Tag name must not exceed 50 characters");
        }

        result
    }
}
