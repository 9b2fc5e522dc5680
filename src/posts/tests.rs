// src/posts/tests.rs

#[cfg(test)]
mod tests {
    use crate::common::Validator;
    use crate::posts::models::*;

    fn create_request() -> CreatePostRequest {
        CreatePostRequest {
            title: "Getting Started with Rust".to_string(),
            content: "Rust is a systems programming language.".to_string(),
            cover_image: None,
            category: None,
            tags: None,
            status: None,
        }
    }

    #[test]
    fn test_valid_create_request() {
        let request = create_request();
        let result = request.validate(&request);
        assert!(result.is_valid);
    }

    #[test]
    fn test_create_request_requires_title_and_content() {
        let mut request = create_request();
        request.title = "   ".to_string();
        request.content = String::new();
        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "title"));
        assert!(result.errors.iter().any(|e| e.field == "content"));
    }

    #[test]
    fn test_create_request_rejects_unknown_status() {
        let mut request = create_request();
        request.status = Some("hidden".to_string());
        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "status"));
    }

    #[test]
    fn test_create_request_rejects_long_title() {
        let mut request = create_request();
        request.title = "a".repeat(256);
        let result = request.validate(&request);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_create_request_rejects_non_http_cover() {
        let mut request = create_request();
        request.cover_image = Some("ftp://example.com/img.png".to_string());
        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "cover_image"));
    }

    #[test]
    fn test_update_request_allows_all_none() {
        let request = UpdatePostRequest {
            title: None,
            content: None,
            cover_image: None,
            category: None,
            tags: None,
            status: None,
        };
        let result = request.validate(&request);
        assert!(result.is_valid);
    }

    #[test]
    fn test_update_request_rejects_empty_title() {
        let request = UpdatePostRequest {
            title: Some("  ".to_string()),
            content: None,
            cover_image: None,
            category: None,
            tags: None,
            status: None,
        };
        let result = request.validate(&request);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_status_values() {
        assert!(is_valid_status("draft"));
        assert!(is_valid_status("published"));
        assert!(is_valid_status("archived"));
        assert!(!is_valid_status("deleted"));
        assert!(!is_valid_status("Published"));
    }

    #[test]
    fn test_category_validator() {
        let request = CreateCategoryRequest {
            name: String::new(),
            description: None,
        };
        let result = request.validate(&request);
        assert!(!result.is_valid);

        let request = CreateCategoryRequest {
            name: "Programming".to_string(),
            description: Some("Articles about code".to_string()),
        };
        let result = request.validate(&request);
        assert!(result.is_valid);
    }

    #[test]
    fn test_tag_validator() {
        let request = CreateTagRequest {
            name: "t".repeat(51),
        };
        let result = request.validate(&request);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_post_response_from_row() {
        let row = PostRow {
            id: "P_ABC123".to_string(),
            author_id: "U_XYZ789".to_string(),
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            content: "World".to_string(),
            cover_image: None,
            category_id: Some("C_AAA111".to_string()),
            status: "published".to_string(),
            views_count: 3,
            created_at: Some("2026-01-01 00:00:00".to_string()),
            updated_at: Some("2026-01-01 00:00:00".to_string()),
            author_username: "alice".to_string(),
            author_avatar: None,
            category_name: Some("Rust".to_string()),
            category_slug: Some("rust".to_string()),
            total_likes: 5,
            total_dislikes: 1,
            total_comments: 2,
            total_shares: 0,
        };

        let response = PostResponse::from_row(row, vec![]);
        assert_eq!(response.author.username, "alice");
        assert_eq!(
            response.category.as_ref().map(|c| c.slug.as_str()),
            Some("rust")
        );
        assert_eq!(response.total_likes, 5);
        assert!(response.tags.is_empty());
    }

    #[test]
    fn test_post_response_without_category() {
        let row = PostRow {
            id: "P_ABC123".to_string(),
            author_id: "U_XYZ789".to_string(),
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            content: "World".to_string(),
            cover_image: None,
            category_id: None,
            status: "draft".to_string(),
            views_count: 0,
            created_at: None,
            updated_at: None,
            author_username: "bob".to_string(),
            author_avatar: None,
            category_name: None,
            category_slug: None,
            total_likes: 0,
            total_dislikes: 0,
            total_comments: 0,
            total_shares: 0,
        };

        let response = PostResponse::from_row(row, vec![]);
        assert!(response.category.is_none());
    }
}
