//! Property-based tests for message content rules

use proptest::prelude::*;
use chatapp::shared::messaging::message::{validate_content, MAX_CONTENT_CHARS};

proptest! {
    #[test]
    fn test_whitespace_only_is_rejected(content in "[ \t\n]{0,50}") {
        prop_assert!(validate_content(&content).is_err());
    }

    #[test]
    fn test_visible_content_within_limit_is_accepted(content in "\\PC{1,200}") {
        prop_assume!(!content.trim().is_empty());
        prop_assert!(validate_content(&content).is_ok());
    }

    #[test]
    fn test_oversized_content_is_rejected(extra in 1usize..64) {
        let content = "x".repeat(MAX_CONTENT_CHARS + extra);
        prop_assert!(validate_content(&content).is_err());
    }
}
