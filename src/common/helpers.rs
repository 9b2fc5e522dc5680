// Helper functions for safe logging and slug generation

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        // First char, not first byte: the local part is raw user input and
        // may start with a multi-byte character.
        match (parts.as_slice(), parts.first().and_then(|p| p.chars().next())) {
            ([_, domain], Some(first)) => format!("{}***@{}", first, domain),
            _ => "***@***.***".to_string(),
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Converts a title or name into a URL slug
///
/// Lowercases, replaces whitespace runs with a single hyphen and drops
/// anything that is not alphanumeric or a hyphen.
///
/// # Example
/// ```
/// let slug = slugify("Hello,  World!");
/// // Returns: "hello-world"
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = true; // suppress leading hyphens

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("ab"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_safe_email_log_handles_multibyte_local_part() {
        // logged on the login failure path with raw user input
        assert_eq!(safe_email_log("émail@example.com"), "é***@example.com");
        assert_eq!(safe_email_log("日本@example.com"), "日***@example.com");
        assert_eq!(safe_email_log("@example.com"), "***@***.***");
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("  Rust & Axum 101  "), "rust-axum-101");
    }

    #[test]
    fn test_slugify_strips_edge_hyphens() {
        assert_eq!(slugify("---title---"), "title");
        assert_eq!(slugify("!!!"), "");
    }
}
