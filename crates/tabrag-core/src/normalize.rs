//! Deterministic text cleanup applied before embedding.
//!
//! # Algorithm
//!
//! 1. Lowercase the input.
//! 2. Replace every ASCII punctuation character with a space.
//! 3. Split on whitespace (which also collapses runs and trims).
//! 4. Drop tokens in [`STOPWORDS`].
//! 5. Join the survivors with single spaces.
//!
//! The output may be empty (e.g. input made only of stopwords); that is not
//! an error and callers pass it to the embedder as-is.
//!
//! ```rust
//! use tabrag_core::normalize::normalize;
//!
//! assert_eq!(normalize("City: Paris, the capital of France!"), "city paris capital france");
//! assert_eq!(normalize("the, and... of"), "");
//! ```

/// Tokens removed from cleaned text.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "in", "on", "to", "for", "of", "is", "are", "was", "were",
    "be", "this", "that", "it", "with", "as", "by",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Normalize free-form row or query text for embedding.
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();

    spaced
        .split_whitespace()
        .filter(|t| !is_stopword(t))
        .collect::<Vec<_>>()
        .join(" ")
}
