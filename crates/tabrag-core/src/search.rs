//! Brute-force cosine-similarity ranking over stored collections.
//!
//! # Algorithm
//!
//! 1. Walk every collection in enumeration order, and every row in row order.
//! 2. Skip rows with an empty embedding.
//! 3. Score the rest: `score = dot(q, v) / (‖q‖ × ‖v‖)`.
//! 4. Rows whose score is undefined (dimension mismatch, zero norm,
//!    non-finite result) are excluded, not fatal.
//! 5. Stable sort by score descending, so ties keep enumeration order.
//! 6. Truncate to `k`.

use std::cmp::Ordering;

use crate::error::{SimilarityError, StoreError};
use crate::models::{Collection, Match};
use crate::store::CollectionStore;

/// Compute cosine similarity between a query vector and a stored vector.
///
/// ```text
///            q · v
/// cos(θ) = ─────────
///          ‖q‖ × ‖v‖
/// ```
///
/// Accumulates in `f64`. The result is symmetric in its arguments.
///
/// # Errors
///
/// - [`SimilarityError::Empty`] if either vector is empty.
/// - [`SimilarityError::DimensionMismatch`] if the lengths differ.
/// - [`SimilarityError::ZeroNorm`] if either vector has zero magnitude.
/// - [`SimilarityError::NonFinite`] if the inputs contain NaN/∞ values.
pub fn cosine_similarity(query: &[f32], stored: &[f32]) -> Result<f64, SimilarityError> {
    if query.is_empty() || stored.is_empty() {
        return Err(SimilarityError::Empty);
    }
    if query.len() != stored.len() {
        return Err(SimilarityError::DimensionMismatch {
            query: query.len(),
            stored: stored.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_q = 0.0f64;
    let mut norm_v = 0.0f64;

    for (&x, &y) in query.iter().zip(stored.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_q += x * x;
        norm_v += y * y;
    }

    if norm_q == 0.0 || norm_v == 0.0 {
        return Err(SimilarityError::ZeroNorm);
    }

    let score = dot / (norm_q.sqrt() * norm_v.sqrt());
    if !score.is_finite() {
        return Err(SimilarityError::NonFinite);
    }
    Ok(score)
}

/// Return the `k` stored rows most similar to `query`.
///
/// Never returns more than `k` matches; scores are non-increasing. Returns
/// an empty vector when nothing is scorable, which callers treat as
/// "no grounding data available".
pub fn top_k<I>(collections: I, query: &[f32], k: usize) -> Vec<Match>
where
    I: IntoIterator<Item = Collection>,
{
    if k == 0 || query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match> = Vec::new();
    let mut excluded = 0usize;

    for collection in collections {
        let source_file = collection.source_file;
        for row in collection.rows {
            if !row.is_scorable() {
                continue;
            }
            match cosine_similarity(query, &row.embedding) {
                Ok(score) => matches.push(Match {
                    row_data: row.row_data,
                    score,
                    source_file: source_file.clone(),
                }),
                Err(e) => {
                    excluded += 1;
                    tracing::debug!(source_file = %source_file, error = %e, "row excluded from ranking");
                }
            }
        }
    }

    if excluded > 0 {
        tracing::debug!(excluded, scored = matches.len(), "ranking pass excluded rows");
    }

    // `sort_by` is stable: equal scores keep enumeration order.
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(k);
    matches
}

/// Rank every collection held by `store` against `query`.
///
/// Unreadable collections are skipped by the store itself; the only error
/// surfaced here is failure to enumerate the store at all.
pub fn search_store<S>(store: &S, query: &[f32], k: usize) -> Result<Vec<Match>, StoreError>
where
    S: CollectionStore + ?Sized,
{
    let collections = store.iterate_collections()?;
    Ok(top_k(collections, query, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RowData, RowRecord};
    use serde_json::json;

    fn row(data: serde_json::Value, embedding: Vec<f32>) -> RowRecord {
        let row_data: RowData = data.as_object().cloned().unwrap();
        RowRecord {
            row_text: crate::models::render_row(&row_data),
            cleaned_text: String::new(),
            row_data,
            embedding,
        }
    }

    fn cities() -> Collection {
        Collection::new(
            "cities.json",
            vec![
                row(json!({"id": 1, "city": "Paris"}), vec![1.0, 0.0]),
                row(json!({"id": 2, "city": "Tokyo"}), vec![0.0, 1.0]),
            ],
        )
    }

    #[test]
    fn test_cosine_identical() {
        let v = [1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = [0.3, -1.2, 4.0, 0.01];
        let b = [2.5, 0.7, -0.2, 9.0];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(
            cosine_similarity(&[1.0, 2.0], &[1.0]),
            Err(SimilarityError::DimensionMismatch { query: 2, stored: 1 })
        );
    }

    #[test]
    fn test_cosine_zero_norm() {
        assert_eq!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]),
            Err(SimilarityError::ZeroNorm)
        );
        assert_eq!(
            cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]),
            Err(SimilarityError::ZeroNorm)
        );
    }

    #[test]
    fn test_cosine_empty_and_nan() {
        assert_eq!(cosine_similarity(&[], &[]), Err(SimilarityError::Empty));
        assert_eq!(
            cosine_similarity(&[1.0, f32::NAN], &[1.0, 1.0]),
            Err(SimilarityError::NonFinite)
        );
    }

    #[test]
    fn test_top1_returns_closest_row() {
        let matches = top_k(vec![cities()], &[0.9, 0.1], 1);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].row_data["city"], "Paris");
        assert_eq!(matches[0].source_file, "cities.json");
    }

    #[test]
    fn test_scores_non_increasing_and_bounded_by_k() {
        let c = Collection::new(
            "grid.csv",
            (0..20)
                .map(|i| {
                    let angle = i as f32 * 0.15;
                    row(json!({ "i": i }), vec![angle.cos(), angle.sin()])
                })
                .collect(),
        );
        let matches = top_k(vec![c], &[0.2, 0.8], 7);
        assert_eq!(matches.len(), 7);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_fewer_rows_than_k() {
        let matches = top_k(vec![cities()], &[0.5, 0.5], 10);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_k_zero() {
        assert!(top_k(vec![cities()], &[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn test_empty_embeddings_never_returned() {
        let c = Collection::new(
            "mixed.csv",
            vec![
                row(json!({"id": "failed"}), Vec::new()),
                row(json!({"id": "ok"}), vec![0.0, 1.0]),
            ],
        );
        let matches = top_k(vec![c], &[1.0, 0.0], 5);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].row_data["id"], "ok");
    }

    #[test]
    fn test_no_scorable_rows() {
        let c = Collection::new("failed.csv", vec![row(json!({"id": 1}), Vec::new())]);
        assert!(top_k(vec![c], &[1.0, 0.0], 5).is_empty());
        assert!(top_k(Vec::<Collection>::new(), &[1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_mismatched_and_zero_rows_excluded() {
        let c = Collection::new(
            "odd.csv",
            vec![
                row(json!({"id": "3d"}), vec![1.0, 0.0, 0.0]),
                row(json!({"id": "zero"}), vec![0.0, 0.0]),
                row(json!({"id": "good"}), vec![1.0, 1.0]),
            ],
        );
        let matches = top_k(vec![c], &[1.0, 0.0], 5);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].row_data["id"], "good");
    }

    #[test]
    fn test_zero_query_yields_nothing() {
        assert!(top_k(vec![cities()], &[0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let first = Collection::new("a.csv", vec![row(json!({"n": "a1"}), vec![1.0, 0.0])]);
        let second = Collection::new(
            "b.csv",
            vec![
                row(json!({"n": "b1"}), vec![2.0, 0.0]),
                row(json!({"n": "b2"}), vec![3.0, 0.0]),
            ],
        );
        let matches = top_k(vec![first, second], &[1.0, 0.0], 3);
        let order: Vec<&str> = matches
            .iter()
            .map(|m| m.row_data["n"].as_str().unwrap())
            .collect();
        assert_eq!(order, vec!["a1", "b1", "b2"]);
    }
}
