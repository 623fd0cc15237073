use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// `1 - distance / max(m, n, 1)`
    pub similarity: f64,
    /// `min(1, n / m)`, or 0 when the target is empty
    pub coverage: f64,
    /// Mean of similarity and coverage.
    pub score: f64,
}

/// Scores an attempt from the target length `m`, the said length `n` and
/// their edit distance.
pub fn score_breakdown(target_len: usize, said_len: usize, distance: usize) -> ScoreBreakdown {
    let max_len = target_len.max(said_len).max(1);
    let similarity = 1.0 - distance as f64 / max_len as f64;
    let coverage = if target_len > 0 {
        (said_len as f64 / target_len as f64).min(1.0)
    } else {
        0.0
    };

    ScoreBreakdown {
        similarity,
        coverage,
        score: (similarity + coverage) / 2.0,
    }
}

pub fn similarity_score(target_len: usize, said_len: usize, distance: usize) -> f64 {
    score_breakdown(target_len, said_len, distance).score
}
