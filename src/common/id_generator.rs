// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., P_K7NP3X for posts)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Post (P_)
    Post,
    /// Comment (M_) - M for Message
    Comment,
    /// Reaction (R_)
    Reaction,
    /// Notification (N_)
    Notification,
    /// Category (C_)
    Category,
    /// Tag (T_)
    Tag,
    /// Share (S_)
    Share,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Post => "P",
            EntityPrefix::Comment => "M",
            EntityPrefix::Reaction => "R",
            EntityPrefix::Notification => "N",
            EntityPrefix::Category => "C",
            EntityPrefix::Tag => "T",
            EntityPrefix::Share => "S",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Example
/// ```
/// let post_id = generate_id(EntityPrefix::Post);
/// // Returns something like "P_K7NP3X"
/// ```
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Useful for slug suffixes or other non-entity identifiers
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Post ID (P_XXXXXX)
pub fn generate_post_id() -> String {
    generate_id(EntityPrefix::Post)
}

/// Generate a Comment ID (M_XXXXXX)
pub fn generate_comment_id() -> String {
    generate_id(EntityPrefix::Comment)
}

/// Generate a Reaction ID (R_XXXXXX)
pub fn generate_reaction_id() -> String {
    generate_id(EntityPrefix::Reaction)
}

/// Generate a Notification ID (N_XXXXXX)
pub fn generate_notification_id() -> String {
    generate_id(EntityPrefix::Notification)
}

/// Generate a Category ID (C_XXXXXX)
pub fn generate_category_id() -> String {
    generate_id(EntityPrefix::Category)
}

/// Generate a Tag ID (T_XXXXXX)
pub fn generate_tag_id() -> String {
    generate_id(EntityPrefix::Tag)
}

/// Generate a Share ID (S_XXXXXX)
pub fn generate_share_id() -> String {
    generate_id(EntityPrefix::Share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let user_id = generate_user_id();
        assert!(user_id.starts_with("U_"));
        assert_eq!(user_id.len(), 8); // "U_" + 6 chars

        let post_id = generate_post_id();
        assert!(post_id.starts_with("P_"));
        assert_eq!(post_id.len(), 8);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_post_id();
        let random_part = &id[2..]; // Skip "P_"

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }

        // Verify no ambiguous characters
        assert!(!random_part.contains('I'));
        assert!(!random_part.contains('L'));
        assert!(!random_part.contains('O'));
        assert!(!random_part.contains('U'));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_post_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_all_prefixes() {
        assert!(generate_user_id().starts_with("U_"));
        assert!(generate_post_id().starts_with("P_"));
        assert!(generate_comment_id().starts_with("M_"));
        assert!(generate_reaction_id().starts_with("R_"));
        assert!(generate_notification_id().starts_with("N_"));
        assert!(generate_category_id().starts_with("C_"));
        assert!(generate_tag_id().starts_with("T_"));
        assert!(generate_share_id().starts_with("S_"));
    }

    #[test]
    fn test_raw_id() {
        let raw = generate_raw_id(8);
        assert_eq!(raw.len(), 8);
        assert!(!raw.contains('_')); // No prefix separator
    }
}
