//! Role-specific context prefixes for embedding input.
//!
//! A category label and an interest label with identical raw text must not
//! collide in the cache or in embedding space, so each role gets its own
//! prefix before embedding.

/// Context prefix for category-role text.
const CATEGORY_CONTEXT: &str = "Food category or restaurant menu section: ";

/// Context prefix for interest-role text.
const INTEREST_CONTEXT: &str = "Food type, cuisine or meal category: ";

/// Wrap a raw category label with its semantic context.
pub fn enhance_category(text: &str) -> String {
    format!("{}{}", CATEGORY_CONTEXT, text.trim())
}

/// Wrap a canonical interest label with its semantic context.
pub fn enhance_interest(text: &str) -> String {
    format!("{}{}", INTEREST_CONTEXT, text.trim())
}
