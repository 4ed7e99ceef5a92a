/*!
Multi-criteria ranking of applicants with consensus fusion.

This crate scores a table of applicants under three multi-criteria decision
making methods (SAW, WP and TOPSIS), turns every score column into ranks and
fuses the ranks into a single consensus ranking with a Borda count.

```
use mcdm_ranking::builder::Builder;
use mcdm_ranking::*;

let criteria = vec!["GPA".to_string(), "Interview".to_string()];
let mut builder = Builder::new(&criteria)?;
builder.add_applicant("A", &[10.0, 5.0])?;
builder.add_applicant("B", &[8.0, 8.0])?;
builder.add_applicant("C", &[4.0, 10.0])?;
let matrix = builder.build()?;

let weights = WeightVector::new(vec![
    ("GPA".to_string(), 0.6),
    ("Interview".to_string(), 0.4),
])?;

let outcome = run_scoring(&matrix, &weights, &Method::ALL, &ScoringRules::DEFAULT_RULES)?;
let borda = outcome.borda.unwrap();
assert_eq!(borda.entries[0].id, "B");
# Ok::<(), RankingErrors>(())
```

See the [manual] for the details of each method.
*/
mod config;
use log::{debug, info, warn};

use std::collections::{HashMap, HashSet};

pub mod builder;
pub mod manual;
pub mod methods;
pub mod normalize;


pub use crate::config::*;

/// Computes the score column of one method.
pub fn score_method(
    method: Method,
    matrix: &FeatureMatrix,
    weights: &WeightVector,
    rules: &ScoringRules,
) -> Result<ScoreColumn, RankingErrors> {
    match method {
        Method::Saw => methods::saw(matrix, weights),
        Method::Wp => methods::wp(matrix, weights, rules.wp_zero_substitute),
        Method::Topsis => methods::topsis(matrix, weights),
    }
}

/// Converts a score column into ranks, 1 being the best.
///
/// The rank of an applicant is 1 + the number of applicants with a strictly
/// greater score: equal scores share the lowest rank of their group and the
/// following ranks are skipped (1, 1, 3).
///
/// The entries are returned in the order of the score column.
pub fn rank_scores(scores: &ScoreColumn) -> RankColumn {
    let values: Vec<f64> = scores.entries.iter().map(|e| e.score).collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));

    let mut ranks: Vec<u32> = vec![0; values.len()];
    let mut current: u32 = 1;
    for (pos, idx) in order.iter().enumerate() {
        if pos > 0 && values[*idx] != values[order[pos - 1]] {
            current = pos as u32 + 1;
        }
        ranks[*idx] = current;
    }

    RankColumn {
        method: scores.method,
        entries: scores
            .entries
            .iter()
            .zip(ranks)
            .map(|(e, rank)| RankEntry {
                id: e.id.clone(),
                rank,
            })
            .collect(),
    }
}

/// Fuses the rank columns of all the methods with a Borda count.
///
/// Every method must be provided exactly once, and all the columns must rank
/// exactly the same applicants. The Borda score of an applicant is the sum
/// over the methods of (N - rank), where N is the number of applicants.
///
/// The table is sorted by decreasing Borda score. Applicants with the same
/// score keep the order of the first column.
pub fn borda_fuse(columns: &[RankColumn]) -> Result<BordaTable, RankingErrors> {
    for method in Method::ALL {
        match columns.iter().filter(|c| c.method == method).count() {
            0 => return Err(RankingErrors::MissingMethod(method)),
            1 => {}
            _ => return Err(RankingErrors::DuplicateMethod(method)),
        }
    }
    let first = &columns[0];
    let num_applicants = first.entries.len();

    let mut rank_lookup: HashMap<Method, HashMap<&str, u32>> = HashMap::new();
    for column in columns.iter() {
        let mut lookup: HashMap<&str, u32> = HashMap::new();
        for e in column.entries.iter() {
            if lookup.insert(e.id.as_str(), e.rank).is_some() {
                return Err(RankingErrors::DuplicateRankEntry {
                    method: column.method,
                    id: e.id.clone(),
                });
            }
            if e.rank == 0 || e.rank as usize > num_applicants {
                return Err(RankingErrors::InvalidRank {
                    method: column.method,
                    id: e.id.clone(),
                    rank: e.rank,
                });
            }
        }
        rank_lookup.insert(column.method, lookup);
    }
    check_same_applicants(first, columns, &rank_lookup)?;

    let n = num_applicants as u64;
    let mut entries: Vec<BordaEntry> = Vec::with_capacity(num_applicants);
    for e in first.entries.iter() {
        let mut ranks: Vec<(Method, u32)> = Vec::with_capacity(Method::ALL.len());
        for method in Method::ALL {
            // Presence was checked above.
            if let Some(rank) = rank_lookup
                .get(&method)
                .and_then(|lookup| lookup.get(e.id.as_str()))
            {
                ranks.push((method, *rank));
            }
        }
        let score: u64 = ranks.iter().map(|(_, rank)| n - *rank as u64).sum();
        debug!("borda_fuse: {}: ranks {:?} -> {}", e.id, ranks, score);
        entries.push(BordaEntry {
            id: e.id.clone(),
            ranks,
            score,
        });
    }
    entries.sort_by(|a, b| b.score.cmp(&a.score));

    Ok(BordaTable {
        num_applicants,
        entries,
    })
}

fn check_same_applicants(
    first: &RankColumn,
    columns: &[RankColumn],
    rank_lookup: &HashMap<Method, HashMap<&str, u32>>,
) -> Result<(), RankingErrors> {
    let reference: HashSet<&str> = first.entries.iter().map(|e| e.id.as_str()).collect();
    for column in columns.iter().skip(1) {
        let lookup = &rank_lookup[&column.method];
        let missing: Vec<String> = first
            .entries
            .iter()
            .filter(|e| !lookup.contains_key(e.id.as_str()))
            .map(|e| e.id.clone())
            .collect();
        let unexpected: Vec<String> = column
            .entries
            .iter()
            .filter(|e| !reference.contains(e.id.as_str()))
            .map(|e| e.id.clone())
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(RankingErrors::MismatchedApplicants {
                method: column.method,
                missing,
                unexpected,
            });
        }
    }
    Ok(())
}

/// Runs the requested methods, ranks their scores and fuses the ranks.
///
/// Arguments:
/// * `matrix` the applicants to score
/// * `weights` one weight per column of the matrix, matched by name
/// * `methods` the methods to run, in order. The Borda fusion only runs when
/// all the methods are requested.
/// * `rules` the policy for unnormalized weights and the WP zero substitute
pub fn run_scoring(
    matrix: &FeatureMatrix,
    weights: &WeightVector,
    methods: &[Method],
    rules: &ScoringRules,
) -> Result<ScoringOutcome, RankingErrors> {
    info!(
        "run_scoring: Processing {} applicants, {} criteria, methods: {:?}, rules: {:?}",
        matrix.num_applicants(),
        matrix.num_criteria(),
        methods,
        rules
    );
    if methods.is_empty() {
        return Err(RankingErrors::NoMethodSelected);
    }
    for (idx, method) in methods.iter().enumerate() {
        if methods[..idx].contains(method) {
            return Err(RankingErrors::DuplicateMethod(*method));
        }
    }

    // Schema problems are reported before the weight policy and any numeric work.
    weights.aligned_to(matrix)?;
    let weights = effective_weights(weights, rules)?;

    let mut scores: Vec<ScoreColumn> = Vec::with_capacity(methods.len());
    let mut ranks: Vec<RankColumn> = Vec::with_capacity(methods.len());
    for method in methods.iter() {
        let column = score_method(*method, matrix, &weights, rules)?;
        let ranking = rank_scores(&column);
        if let Some(best) = column.sorted_desc().first() {
            info!("{}: best applicant {} (score {})", method, best.id, best.score);
        }
        scores.push(column);
        ranks.push(ranking);
    }

    let borda = if Method::ALL.iter().all(|m| methods.contains(m)) {
        let table = borda_fuse(&ranks)?;
        for (pos, e) in table.entries.iter().enumerate() {
            info!("Borda {:>4}: {} ({})", pos + 1, e.id, e.score);
        }
        Some(table)
    } else {
        info!("run_scoring: not all the methods were requested, skipping the Borda fusion");
        None
    };

    Ok(ScoringOutcome {
        weights,
        scores,
        ranks,
        borda,
    })
}

fn effective_weights(
    weights: &WeightVector,
    rules: &ScoringRules,
) -> Result<WeightVector, RankingErrors> {
    if weights.is_normalized() {
        return Ok(weights.clone());
    }
    match rules.weight_normalization {
        WeightNormalization::Reject => Err(RankingErrors::UnnormalizedWeights {
            sum: weights.sum(),
        }),
        WeightNormalization::Renormalize => {
            warn!(
                "The weights sum to {} instead of 1, normalizing them",
                weights.sum()
            );
            weights.normalized()
        }
    }
}
