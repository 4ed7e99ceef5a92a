//! The three scoring methods.
//!
//! Each method is a pure function of the feature matrix and the weight
//! vector: the inputs are only borrowed and a new score column is returned.
//! The weights are aligned to the matrix columns by name before any
//! computation. The functions accept any non-negative weights, the
//! normalization policy is applied by [`crate::run_scoring`].

use log::debug;

use crate::config::*;
use crate::normalize::{max_normalize, vector_normalize};

/// Simple Additive Weighting: the weighted sum of the max-normalized values.
pub fn saw(matrix: &FeatureMatrix, weights: &WeightVector) -> Result<ScoreColumn, RankingErrors> {
    let w = weights.aligned_to(matrix)?;
    let norm = max_normalize(matrix)?;
    let scores: Vec<f64> = norm.iter().map(|row| weighted_sum(row, &w)).collect();
    score_column(matrix, Method::Saw, scores)
}

/// Weighted Product: exp(sum_j w_j * ln(x_ij)).
///
/// Zero values are replaced by `zero_substitute` (see [`WP_ZERO_SUBSTITUTE`])
/// so that the logarithm is defined. An applicant with a zero value is then
/// heavily penalized instead of getting a score of exactly zero.
pub fn wp(
    matrix: &FeatureMatrix,
    weights: &WeightVector,
    zero_substitute: f64,
) -> Result<ScoreColumn, RankingErrors> {
    if !(zero_substitute > 0.0 && zero_substitute.is_finite()) {
        return Err(RankingErrors::InvalidZeroSubstitute(zero_substitute));
    }
    let w = weights.aligned_to(matrix)?;
    let scores: Vec<f64> = matrix
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(w.iter())
                .map(|(x, w)| {
                    let safe = if *x == 0.0 { zero_substitute } else { *x };
                    safe.ln() * w
                })
                .sum::<f64>()
                .exp()
        })
        .collect();
    score_column(matrix, Method::Wp, scores)
}

/// TOPSIS: the relative closeness of each applicant to the ideal-best
/// applicant, d- / (d+ + d-).
///
/// The ideal-best (resp. ideal-worst) vector takes the column maximum (resp.
/// minimum) of the weighted normalized matrix.
pub fn topsis(
    matrix: &FeatureMatrix,
    weights: &WeightVector,
) -> Result<ScoreColumn, RankingErrors> {
    let w = weights.aligned_to(matrix)?;
    let norm = vector_normalize(matrix)?;
    let weighted: Vec<Vec<f64>> = norm
        .iter()
        .map(|row| row.iter().zip(w.iter()).map(|(x, w)| x * w).collect())
        .collect();

    let ideal_best: Vec<f64> = (0..w.len())
        .map(|j| {
            weighted
                .iter()
                .map(|row| row[j])
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();
    let ideal_worst: Vec<f64> = (0..w.len())
        .map(|j| weighted.iter().map(|row| row[j]).fold(f64::INFINITY, f64::min))
        .collect();
    debug!(
        "topsis: ideal best: {:?} ideal worst: {:?}",
        ideal_best, ideal_worst
    );

    let mut scores: Vec<f64> = Vec::with_capacity(weighted.len());
    for (row, id) in weighted.iter().zip(matrix.ids()) {
        let d_best = distance(row, &ideal_best);
        let d_worst = distance(row, &ideal_worst);
        let total = d_best + d_worst;
        if total <= 0.0 {
            return Err(RankingErrors::DegenerateDistance { id: id.clone() });
        }
        scores.push(d_worst / total);
    }
    score_column(matrix, Method::Topsis, scores)
}

fn weighted_sum(row: &[f64], weights: &[f64]) -> f64 {
    row.iter().zip(weights).map(|(x, w)| x * w).sum()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn score_column(
    matrix: &FeatureMatrix,
    method: Method,
    scores: Vec<f64>,
) -> Result<ScoreColumn, RankingErrors> {
    let mut entries: Vec<ScoreEntry> = Vec::with_capacity(scores.len());
    for (row, (id, score)) in matrix.ids().iter().zip(scores).enumerate() {
        if !score.is_finite() {
            return Err(RankingErrors::NonFiniteScore {
                method,
                id: id.clone(),
            });
        }
        debug!("{}: {} -> {}", method, id, score);
        entries.push(ScoreEntry {
            id: id.clone(),
            row,
            score,
        });
    }
    Ok(ScoreColumn { method, entries })
}
