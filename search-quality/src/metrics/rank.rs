//! Rank-aware quality metrics over an ordered list of relevance scores.
//!
//! The score list is a query's ranked result window: the judgment of the
//! document at rank one first, and so on. Callers fetch their result lists
//! with `size = k`, so the supplied window is already the top-k slice.

use crate::utils::nan_safe_f64_cmp_desc;

/// Discounted Cumulative Gain over the first `k` entries of the window.
///
/// Uses exponential gains (`2^score - 1`) with the standard logarithmic
/// position discount. A zero score contributes nothing but still occupies its
/// rank for subsequent discounting. Windows shorter than `k` are used as-is,
/// never padded.
pub fn dcg(relevance_scores: &[f64], k: usize) -> f64 {
    relevance_scores
        .iter()
        .take(k)
        .enumerate()
        .map(|(index, &score)| gain(score) / discount(index + 1))
        .sum()
}

/// Normalized DCG: the window's DCG divided by the DCG of its ideal
/// (non-increasing) reordering.
///
/// The ideal ordering is the same multiset of scores sorted descending, so
/// ties between equal scores cannot change the ideal sum. The normalization
/// spans the whole supplied window, the already-cut top-`k` slice. A zero
/// ideal (no positive score in the window) yields zero instead of a division
/// fault.
pub fn ndcg(relevance_scores: &[f64], k: usize) -> f64 {
    debug_assert!(k >= 1);
    let mut ideal = relevance_scores.to_vec();
    ideal.sort_unstable_by(nan_safe_f64_cmp_desc);

    let ideal_dcg = dcg(&ideal, ideal.len());
    if ideal_dcg == 0. {
        0.
    } else {
        dcg(relevance_scores, relevance_scores.len()) / ideal_dcg
    }
}

/// Precision@k: the share of the first `k` entries whose score meets the
/// relevance threshold.
///
/// Divided by `k`, or by the number of entries actually supplied when the
/// window is shorter than `k`.
pub fn precision(relevance_scores: &[f64], k: usize, threshold: f64) -> f64 {
    debug_assert!(k >= 1);
    let denominator = k.min(relevance_scores.len());
    if denominator == 0 {
        return 0.;
    }

    let relevant = relevance_scores
        .iter()
        .take(k)
        .filter(|&&score| score >= threshold)
        .count();

    relevant as f64 / denominator as f64
}

fn gain(score: f64) -> f64 {
    score.exp2() - 1.
}

fn discount(rank: usize) -> f64 {
    ((rank + 1) as f64).log2()
}
