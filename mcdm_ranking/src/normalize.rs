//! Per-method normalization of the feature matrix.
//!
//! Both normalizers scale each criterion column by a single positive
//! divisor, which makes the weighted aggregation independent of the unit of
//! each criterion. A column whose divisor is zero (every applicant has a zero
//! value) cannot be normalized and is reported as a degenerate input.

use log::debug;

use crate::config::*;

/// Divides each column by its maximum (used by SAW).
///
/// Since all the values are non-negative, every normalized value is in [0, 1].
pub fn max_normalize(matrix: &FeatureMatrix) -> Result<Vec<Vec<f64>>, RankingErrors> {
    let divisors = column_divisors(matrix, Method::Saw, |col| {
        col.iter().cloned().fold(0.0, f64::max)
    })?;
    Ok(scale_columns(matrix, &divisors))
}

/// Divides each column by its Euclidean norm (used by TOPSIS).
///
/// Every normalized column has a norm of 1.
pub fn vector_normalize(matrix: &FeatureMatrix) -> Result<Vec<Vec<f64>>, RankingErrors> {
    let divisors = column_divisors(matrix, Method::Topsis, |col| {
        col.iter().map(|x| x * x).sum::<f64>().sqrt()
    })?;
    Ok(scale_columns(matrix, &divisors))
}

fn column_divisors(
    matrix: &FeatureMatrix,
    method: Method,
    reduce: fn(&[f64]) -> f64,
) -> Result<Vec<f64>, RankingErrors> {
    let mut res: Vec<f64> = Vec::with_capacity(matrix.num_criteria());
    for (idx, criterion) in matrix.criteria().iter().enumerate() {
        let divisor = reduce(&matrix.column(idx));
        if !(divisor > 0.0 && divisor.is_finite()) {
            return Err(RankingErrors::DegenerateColumn {
                method,
                criterion: criterion.clone(),
            });
        }
        res.push(divisor);
    }
    debug!("column_divisors: {}: {:?}", method, res);
    Ok(res)
}

fn scale_columns(matrix: &FeatureMatrix, divisors: &[f64]) -> Vec<Vec<f64>> {
    matrix
        .rows()
        .iter()
        .map(|row| row.iter().zip(divisors).map(|(x, d)| x / d).collect())
        .collect()
}
