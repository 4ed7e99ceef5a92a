// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The scoring methods supported by the engine.
///
/// All of them treat every criterion as a benefit criterion: a larger raw
/// value is always more favorable.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Method {
    /// Simple Additive Weighting: weighted sum of the max-normalized values.
    Saw,
    /// Weighted Product: product of the values raised to their weights,
    /// computed in log space.
    Wp,
    /// Relative closeness to the ideal-best and ideal-worst applicants.
    Topsis,
}

impl Method {
    /// All the methods, in the order used by the fused ranking table.
    pub const ALL: [Method; 3] = [Method::Saw, Method::Wp, Method::Topsis];

    pub fn name(&self) -> &'static str {
        match self {
            Method::Saw => "SAW",
            Method::Wp => "WP",
            Method::Topsis => "TOPSIS",
        }
    }

    /// The name of the column holding the scores of this method.
    pub fn score_column(&self) -> String {
        format!("{}_Score", self.name())
    }

    /// The name of the column holding the ranks of this method in the fused table.
    pub fn rank_column(&self) -> String {
        format!("Rank_{}", self.name())
    }

    /// The name of the artifact written for this method (`saw_result`, ...).
    pub fn artifact_name(&self) -> String {
        format!("{}_result", self.name().to_lowercase())
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Method {
    type Err = RankingErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "saw" => Ok(Method::Saw),
            "wp" => Ok(Method::Wp),
            "topsis" => Ok(Method::Topsis),
            _ => Err(RankingErrors::UnknownMethod(s.to_string())),
        }
    }
}

/// The numeric table consumed by the scoring methods.
///
/// Invariants, checked at construction:
/// - at least one criterion and one applicant
/// - one value per criterion for every applicant
/// - non-empty, unique applicant identifiers and unique criterion names
/// - finite, non-negative values
#[derive(PartialEq, Debug, Clone)]
pub struct FeatureMatrix {
    criteria: Vec<String>,
    ids: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(
        criteria: Vec<String>,
        applicants: Vec<(String, Vec<f64>)>,
    ) -> Result<FeatureMatrix, RankingErrors> {
        check_criteria(&criteria)?;
        if applicants.is_empty() {
            return Err(RankingErrors::EmptyMatrix);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for (row_idx, (id, values)) in applicants.iter().enumerate() {
            if id.trim().is_empty() {
                return Err(RankingErrors::EmptyApplicantId { row: row_idx });
            }
            if !seen.insert(id.as_str()) {
                return Err(RankingErrors::DuplicateApplicant(id.clone()));
            }
            check_row(&criteria, id, values)?;
        }
        let (ids, rows): (Vec<String>, Vec<Vec<f64>>) = applicants.into_iter().unzip();
        Ok(FeatureMatrix {
            criteria,
            ids,
            rows,
        })
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_applicants(&self) -> usize {
        self.ids.len()
    }

    pub fn num_criteria(&self) -> usize {
        self.criteria.len()
    }

    /// The values of one criterion, in applicant order.
    pub fn column(&self, idx: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[idx]).collect()
    }
}

pub(crate) fn check_criteria(criteria: &[String]) -> Result<(), RankingErrors> {
    if criteria.is_empty() {
        return Err(RankingErrors::EmptyMatrix);
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for c in criteria.iter() {
        if !seen.insert(c.as_str()) {
            return Err(RankingErrors::DuplicateCriterion(c.clone()));
        }
    }
    Ok(())
}

pub(crate) fn check_row(criteria: &[String], id: &str, values: &[f64]) -> Result<(), RankingErrors> {
    if values.len() != criteria.len() {
        return Err(RankingErrors::RowLength {
            id: id.to_string(),
            expected: criteria.len(),
            found: values.len(),
        });
    }
    for (criterion, value) in criteria.iter().zip(values) {
        if !value.is_finite() || *value < 0.0 {
            return Err(RankingErrors::InvalidValue {
                id: id.to_string(),
                criterion: criterion.clone(),
                value: *value,
            });
        }
    }
    Ok(())
}

/// An ordered mapping from criterion name to a non-negative weight.
///
/// A weight vector is either raw (for example user ratings from 1 to 5) or
/// normalized (the weights sum to 1 within `NORMALIZATION_TOLERANCE`).
/// Weights are matched to the columns of a feature matrix by name, never by
/// position.
#[derive(PartialEq, Debug, Clone)]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl WeightVector {
    pub const NORMALIZATION_TOLERANCE: f64 = 1e-3;

    pub fn new(entries: Vec<(String, f64)>) -> Result<WeightVector, RankingErrors> {
        if entries.is_empty() {
            return Err(RankingErrors::EmptyWeights);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for (name, w) in entries.iter() {
            if !seen.insert(name.as_str()) {
                return Err(RankingErrors::DuplicateCriterion(name.clone()));
            }
            if !w.is_finite() || *w < 0.0 {
                return Err(RankingErrors::InvalidWeight {
                    criterion: name.clone(),
                    value: *w,
                });
            }
        }
        Ok(WeightVector { entries })
    }

    /// The same weight for every criterion, summing to 1.
    pub fn uniform(criteria: &[String]) -> Result<WeightVector, RankingErrors> {
        let w = 1.0 / criteria.len().max(1) as f64;
        WeightVector::new(criteria.iter().map(|c| (c.clone(), w)).collect())
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn get(&self, criterion: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == criterion)
            .map(|(_, w)| *w)
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| *w).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < WeightVector::NORMALIZATION_TOLERANCE
    }

    /// Divides every weight by the total, so that the weights sum to 1.
    pub fn normalized(&self) -> Result<WeightVector, RankingErrors> {
        let total = self.sum();
        if total <= 0.0 {
            return Err(RankingErrors::ZeroWeightSum);
        }
        Ok(WeightVector {
            entries: self
                .entries
                .iter()
                .map(|(name, w)| (name.clone(), w / total))
                .collect(),
        })
    }

    /// Multiplies every weight by a positive factor.
    pub fn scaled(&self, factor: f64) -> Result<WeightVector, RankingErrors> {
        WeightVector::new(
            self.entries
                .iter()
                .map(|(name, w)| (name.clone(), w * factor))
                .collect(),
        )
    }

    /// Returns the weights in the column order of the matrix.
    ///
    /// Every column of the matrix must have a weight, and every weight must
    /// correspond to a column.
    pub fn aligned_to(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, RankingErrors> {
        for (name, _) in self.entries.iter() {
            if !matrix.criteria().contains(name) {
                return Err(RankingErrors::UnexpectedCriterion(name.clone()));
            }
        }
        matrix
            .criteria()
            .iter()
            .map(|c| {
                self.get(c)
                    .ok_or_else(|| RankingErrors::MissingCriterion(c.clone()))
            })
            .collect()
    }
}

/// What to do with a weight vector that does not sum to 1.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum WeightNormalization {
    /// Divide the weights by their sum before scoring (a warning is logged).
    Renormalize,
    /// Refuse to score.
    Reject,
}

/// The value that replaces a zero cell in the Weighted Product method.
///
/// Without it, the logarithm of a zero value is undefined. A true zero is
/// treated as "nearly zero" instead of zeroing the whole product.
pub const WP_ZERO_SUBSTITUTE: f64 = 1e-6;

#[derive(PartialEq, Debug, Clone)]
pub struct ScoringRules {
    pub weight_normalization: WeightNormalization,
    pub wp_zero_substitute: f64,
}

impl ScoringRules {
    pub const DEFAULT_RULES: ScoringRules = ScoringRules {
        weight_normalization: WeightNormalization::Renormalize,
        wp_zero_substitute: WP_ZERO_SUBSTITUTE,
    };
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct ScoreEntry {
    pub id: String,
    /// The position of the applicant in the feature matrix.
    pub row: usize,
    pub score: f64,
}

/// The scores of one method, in the row order of the feature matrix.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreColumn {
    pub method: Method,
    pub entries: Vec<ScoreEntry>,
}

impl ScoreColumn {
    /// The entries sorted by decreasing score. Equal scores keep the matrix order.
    pub fn sorted_desc(&self) -> Vec<ScoreEntry> {
        let mut res = self.entries.clone();
        res.sort_by(|a, b| b.score.total_cmp(&a.score));
        res
    }

    pub fn score_of(&self, id: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.score)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankEntry {
    pub id: String,
    /// 1 is the best rank.
    pub rank: u32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankColumn {
    pub method: Method,
    pub entries: Vec<RankEntry>,
}

impl RankColumn {
    pub fn rank_of(&self, id: &str) -> Option<u32> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.rank)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BordaEntry {
    pub id: String,
    /// The rank given by each method, in the order of `Method::ALL`.
    pub ranks: Vec<(Method, u32)>,
    pub score: u64,
}

/// The consensus ranking, sorted by decreasing Borda score.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BordaTable {
    pub num_applicants: usize,
    pub entries: Vec<BordaEntry>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ScoringOutcome {
    /// The weights that were actually used, after applying the normalization policy.
    pub weights: WeightVector,
    /// One column per requested method, in request order.
    pub scores: Vec<ScoreColumn>,
    pub ranks: Vec<RankColumn>,
    /// Only available when all the methods were requested.
    pub borda: Option<BordaTable>,
}

/// Errors that prevent the scoring or the fusion from completing.
#[derive(PartialEq, Debug, Clone)]
pub enum RankingErrors {
    // Schema errors
    EmptyMatrix,
    RowLength {
        id: String,
        expected: usize,
        found: usize,
    },
    EmptyApplicantId {
        row: usize,
    },
    DuplicateApplicant(String),
    DuplicateCriterion(String),
    InvalidValue {
        id: String,
        criterion: String,
        value: f64,
    },
    EmptyWeights,
    InvalidWeight {
        criterion: String,
        value: f64,
    },
    MissingCriterion(String),
    UnexpectedCriterion(String),
    UnnormalizedWeights {
        sum: f64,
    },
    ZeroWeightSum,
    InvalidZeroSubstitute(f64),
    UnknownMethod(String),
    NoMethodSelected,
    // Degenerate inputs
    DegenerateColumn {
        method: Method,
        criterion: String,
    },
    DegenerateDistance {
        id: String,
    },
    NonFiniteScore {
        method: Method,
        id: String,
    },
    // Consistency errors
    MissingMethod(Method),
    DuplicateMethod(Method),
    DuplicateRankEntry {
        method: Method,
        id: String,
    },
    InvalidRank {
        method: Method,
        id: String,
        rank: u32,
    },
    MismatchedApplicants {
        method: Method,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

impl Error for RankingErrors {}

impl Display for RankingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingErrors::EmptyMatrix => {
                write!(f, "the feature matrix needs at least one applicant and one criterion")
            }
            RankingErrors::RowLength {
                id,
                expected,
                found,
            } => write!(
                f,
                "applicant {}: expected {} criterion values, found {}",
                id, expected, found
            ),
            RankingErrors::EmptyApplicantId { row } => {
                write!(f, "applicant at row {} has an empty identifier", row)
            }
            RankingErrors::DuplicateApplicant(id) => write!(f, "duplicate applicant {}", id),
            RankingErrors::DuplicateCriterion(c) => write!(f, "duplicate criterion {}", c),
            RankingErrors::InvalidValue {
                id,
                criterion,
                value,
            } => write!(
                f,
                "applicant {}: value {} for {} is not a finite non-negative number",
                id, value, criterion
            ),
            RankingErrors::EmptyWeights => write!(f, "the weight vector is empty"),
            RankingErrors::InvalidWeight { criterion, value } => write!(
                f,
                "weight {} for {} is not a finite non-negative number",
                value, criterion
            ),
            RankingErrors::MissingCriterion(c) => write!(f, "no weight for criterion {}", c),
            RankingErrors::UnexpectedCriterion(c) => {
                write!(f, "weight given for unknown criterion {}", c)
            }
            RankingErrors::UnnormalizedWeights { sum } => {
                write!(f, "the weights sum to {} instead of 1", sum)
            }
            RankingErrors::ZeroWeightSum => write!(f, "the weights sum to zero"),
            RankingErrors::InvalidZeroSubstitute(v) => {
                write!(f, "the WP zero substitute must be positive, got {}", v)
            }
            RankingErrors::UnknownMethod(s) => write!(f, "unknown scoring method {:?}", s),
            RankingErrors::NoMethodSelected => write!(f, "no scoring method selected"),
            RankingErrors::DegenerateColumn { method, criterion } => write!(
                f,
                "{}: criterion {} is zero for every applicant and cannot be normalized",
                method, criterion
            ),
            RankingErrors::DegenerateDistance { id } => write!(
                f,
                "TOPSIS: applicant {} is at distance zero from both ideal solutions",
                id
            ),
            RankingErrors::NonFiniteScore { method, id } => {
                write!(f, "{}: the score of applicant {} is not finite", method, id)
            }
            RankingErrors::MissingMethod(m) => write!(f, "no ranks provided for {}", m),
            RankingErrors::DuplicateMethod(m) => write!(f, "{} provided more than once", m),
            RankingErrors::DuplicateRankEntry { method, id } => {
                write!(f, "{}: applicant {} is ranked more than once", method, id)
            }
            RankingErrors::InvalidRank { method, id, rank } => {
                write!(f, "{}: applicant {} has invalid rank {}", method, id, rank)
            }
            RankingErrors::MismatchedApplicants {
                method,
                missing,
                unexpected,
            } => write!(
                f,
                "{}: the ranked applicants differ (missing: {:?}, unexpected: {:?})",
                method, missing, unexpected
            ),
        }
    }
}
