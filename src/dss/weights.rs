//! Criterion weights: read from a file, derived from 1 to 5 ratings, or the
//! uniform fallback.

use std::collections::BTreeMap;

use crate::dss::config_reader::WeightSettings;
use crate::dss::io_common::parse_number;
use crate::dss::schema::Criterion;
use crate::dss::*;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum WeightSource {
    /// Read from the given file.
    File(String),
    /// Normalized from importance ratings.
    Ratings,
    /// The same weight for every criterion.
    Fallback,
}

impl WeightSource {
    pub fn describe(&self) -> String {
        match self {
            WeightSource::File(p) => format!("file {}", p),
            WeightSource::Ratings => "custom ratings".to_string(),
            WeightSource::Fallback => "default uniform weights".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedWeights {
    pub weights: WeightVector,
    pub source: WeightSource,
}

pub fn fallback_weights() -> DssResult<WeightVector> {
    WeightVector::uniform(&Criterion::column_names()).context(RankingSnafu {})
}

/// Reads the first data row of a weight file. The header names the criteria.
pub fn load_weights_csv(path: &str) -> DssResult<WeightVector> {
    let table = io_csv::read_csv_table(path).map_err(|e| *e)?;
    let first = table.rows.first().context(EmptyTableSnafu { path })?;

    let mut entries: Vec<(String, f64)> = Vec::with_capacity(table.headers.len());
    for (idx, name) in table.headers.iter().enumerate() {
        if Criterion::from_column_name(name).is_none() {
            return UnknownCriterionSnafu { name: name.clone() }.fail();
        }
        let cell = first.get(idx).cloned().unwrap_or_default();
        let w = parse_number(&cell).context(NotANumberSnafu {
            lineno: 2usize,
            column: name.clone(),
            content: cell.clone(),
        })?;
        entries.push((name.clone(), w));
    }

    let missing: Vec<String> = Criterion::ALL
        .iter()
        .map(|c| c.column_name().to_string())
        .filter(|c| !table.headers.contains(c))
        .collect();
    ensure!(missing.is_empty(), MissingColumnsSnafu { missing });

    debug!("load_weights_csv: {:?} {:?}", path, entries);
    WeightVector::new(entries).context(RankingSnafu {})
}

/// Parses `CRITERION=RATING`, for example `C1_GPA=5`.
pub fn parse_rating(s: &str) -> DssResult<(String, f64)> {
    let (name, rating) = s
        .split_once('=')
        .context(InvalidRatingSnafu { content: s })?;
    let name = name.trim();
    ensure!(
        Criterion::from_column_name(name).is_some(),
        UnknownCriterionSnafu { name }
    );
    let rating = parse_number(rating).context(InvalidRatingSnafu { content: s })?;
    ensure!(
        valid_rating(rating),
        InvalidRatingSnafu { content: s }
    );
    Ok((name.to_string(), rating))
}

fn valid_rating(rating: f64) -> bool {
    rating.fract() == 0.0 && (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Turns one rating per criterion into weights that sum to 1.
pub fn ratings_weights(ratings: &BTreeMap<String, f64>) -> DssResult<WeightVector> {
    for (name, rating) in ratings.iter() {
        ensure!(
            Criterion::from_column_name(name).is_some(),
            UnknownCriterionSnafu { name: name.clone() }
        );
        ensure!(
            valid_rating(*rating),
            InvalidRatingSnafu {
                content: format!("{}={}", name, rating)
            }
        );
    }
    let missing: Vec<String> = Criterion::column_names()
        .into_iter()
        .filter(|c| !ratings.contains_key(c))
        .collect();
    ensure!(missing.is_empty(), MissingColumnsSnafu { missing });

    let entries: Vec<(String, f64)> = Criterion::ALL
        .iter()
        .filter_map(|c| {
            ratings
                .get(c.column_name())
                .map(|r| (c.column_name().to_string(), *r))
        })
        .collect();
    WeightVector::new(entries)
        .and_then(|w| w.normalized())
        .context(RankingSnafu {})
}

/// Picks the weights of a run. Ratings take precedence over a weight file.
/// Without either, the uniform weights are used.
pub fn resolve_weights(settings: &WeightSettings) -> DssResult<LoadedWeights> {
    if let Some(ratings) = &settings.ratings {
        if let Some(p) = &settings.file_path {
            warn!("Custom ratings provided: ignoring the weight file {}", p);
        }
        return Ok(LoadedWeights {
            weights: ratings_weights(ratings)?,
            source: WeightSource::Ratings,
        });
    }
    match &settings.file_path {
        Some(p) => match load_weights_csv(p) {
            Ok(weights) => Ok(LoadedWeights {
                weights,
                source: WeightSource::File(p.clone()),
            }),
            Err(e) if settings.fallback_to_default.unwrap_or(false) => {
                warn!("Could not read the weights from {}: {}. Using the default weights", p, e);
                Ok(LoadedWeights {
                    weights: fallback_weights()?,
                    source: WeightSource::Fallback,
                })
            }
            Err(e) => Err(e),
        },
        None => {
            warn!("No weights provided: every criterion receives the same weight");
            Ok(LoadedWeights {
                weights: fallback_weights()?,
                source: WeightSource::Fallback,
            })
        }
    }
}

fn format_weight(w: f64) -> String {
    if w < 1.0 {
        format!("{:.3}", w)
    } else {
        format!("{}", w)
    }
}

/// A printable table of the weights, one line per criterion.
pub fn weights_report(weights: &WeightVector) -> Vec<String> {
    let normalized = weights.normalized().ok();
    let mut lines = vec![format!(
        "{:<20} {:<16} {:>8} {:>10}  {}",
        "Criterion", "Label", "Weight", "Normalized", "Description"
    )];
    for (name, w) in weights.entries().iter() {
        let n = normalized
            .as_ref()
            .and_then(|nw| nw.get(name))
            .map(format_weight)
            .unwrap_or_else(|| "-".to_string());
        let criterion = Criterion::from_column_name(name);
        let label = criterion.map(|c| c.label()).unwrap_or_default();
        let description = criterion.map(|c| c.description()).unwrap_or("");
        lines.push(format!(
            "{:<20} {:<16} {:>8} {:>10}  {}",
            name,
            label,
            format_weight(*w),
            n,
            description
        ));
    }
    let status = if weights.is_normalized() {
        "normalized"
    } else {
        "not normalized"
    };
    lines.push(format!("Total: {:.4} ({})", weights.sum(), status));
    lines
}

/// Writes the weights as a CSV file with a single row.
pub fn save_weights(path: &str, weights: &WeightVector) -> DssResult<()> {
    let headers: Vec<String> = weights.entries().iter().map(|(n, _)| n.clone()).collect();
    let row: Vec<String> = weights
        .entries()
        .iter()
        .map(|(_, w)| w.to_string())
        .collect();
    io_csv::write_csv_table(path, &headers, &[row]).map_err(|e| *e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn data_path(name: &str) -> String {
        [env!("CARGO_MANIFEST_DIR"), "tests", "data", name]
            .iter()
            .collect::<PathBuf>()
            .display()
            .to_string()
    }

    fn scratch_file(name: &str, content: &str) -> String {
        let dir = std::env::temp_dir().join("scholarship-dss-weights");
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    fn all_ratings(r: f64) -> BTreeMap<String, f64> {
        Criterion::column_names().into_iter().map(|c| (c, r)).collect()
    }

    #[test]
    fn default_weight_file() {
        let w = load_weights_csv(&data_path("weight_default.csv")).unwrap();
        assert_eq!(w.entries().len(), 10);
        assert_eq!(w.get("C1_GPA"), Some(0.2));
        assert_eq!(w.get("C10_OnTime"), Some(0.05));
        assert!(w.is_normalized());
    }

    #[test]
    fn weight_file_schema() {
        let header = Criterion::column_names().join(",");
        let p = scratch_file(
            "extra.csv",
            &format!("{},C11_Sports\n{}\n", header, vec!["0.1"; 11].join(",")),
        );
        assert!(matches!(
            load_weights_csv(&p),
            Err(DssError::UnknownCriterion { .. })
        ));

        let short: Vec<String> = Criterion::column_names().into_iter().take(9).collect();
        let p = scratch_file(
            "short.csv",
            &format!("{}\n{}\n", short.join(","), vec!["0.1"; 9].join(",")),
        );
        match load_weights_csv(&p) {
            Err(DssError::MissingColumns { missing }) => assert_eq!(missing, vec!["C10_OnTime"]),
            x => panic!("unexpected {:?}", x),
        }

        let p = scratch_file("header_only.csv", &format!("{}\n", header));
        assert!(matches!(load_weights_csv(&p), Err(DssError::EmptyTable { .. })));

        let mut cells = vec!["0.1"; 10];
        cells[3] = "high";
        let p = scratch_file("text.csv", &format!("{}\n{}\n", header, cells.join(",")));
        assert!(matches!(
            load_weights_csv(&p),
            Err(DssError::NotANumber { lineno: 2, .. })
        ));
    }

    #[test]
    fn ratings() {
        assert_eq!(parse_rating("C1_GPA=5").unwrap(), ("C1_GPA".to_string(), 5.0));
        assert_eq!(parse_rating(" C4_Dependents = 2 ").unwrap().1, 2.0);
        for bad in ["C1_GPA", "C1_GPA=0", "C1_GPA=6", "C1_GPA=2.5", "C1_GPA=x"] {
            assert!(
                matches!(parse_rating(bad), Err(DssError::InvalidRating { .. })),
                "{}",
                bad
            );
        }
        assert!(matches!(
            parse_rating("GPA=3"),
            Err(DssError::UnknownCriterion { .. })
        ));

        let mut r = all_ratings(1.0);
        r.insert("C1_GPA".to_string(), 5.0);
        let w = ratings_weights(&r).unwrap();
        assert!(w.is_normalized());
        assert!((w.get("C1_GPA").unwrap() - 5.0 / 14.0).abs() < 1e-12);
        assert!((w.get("C2_Certificates").unwrap() - 1.0 / 14.0).abs() < 1e-12);

        r.remove("C7_LetterScore");
        assert!(matches!(
            ratings_weights(&r),
            Err(DssError::MissingColumns { .. })
        ));
    }

    #[test]
    fn weight_selection() {
        let mut settings = WeightSettings::default();
        let loaded = resolve_weights(&settings).unwrap();
        assert_eq!(loaded.source, WeightSource::Fallback);
        assert_eq!(loaded.weights.get("C5_OrgScore"), Some(0.1));

        settings.file_path = Some(data_path("weight_default.csv"));
        settings.ratings = Some(all_ratings(3.0));
        let loaded = resolve_weights(&settings).unwrap();
        assert_eq!(loaded.source, WeightSource::Ratings);
        assert!((loaded.weights.get("C5_OrgScore").unwrap() - 0.1).abs() < 1e-12);

        settings.ratings = None;
        settings.file_path = Some(data_path("missing_weights.csv"));
        assert!(resolve_weights(&settings).is_err());
        settings.fallback_to_default = Some(true);
        assert_eq!(resolve_weights(&settings).unwrap().source, WeightSource::Fallback);
    }

    #[test]
    fn report_and_save() {
        let w = WeightVector::new(vec![
            ("C1_GPA".to_string(), 2.0),
            ("C2_Certificates".to_string(), 2.0),
        ])
        .unwrap();
        let lines = weights_report(&w);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("C1_GPA"));
        assert!(lines[1].contains("0.500"));
        assert!(lines[1].contains(" GPA "));
        assert!(lines[1].contains("Grade Point Average"));
        assert_eq!(lines[3], "Total: 4.0000 (not normalized)");

        let p = scratch_file("saved.csv", "");
        save_weights(&p, &w.normalized().unwrap()).unwrap();
        assert_eq!(
            fs::read_to_string(&p).unwrap(),
            "C1_GPA,C2_Certificates\n0.5,0.5\n"
        );
    }
}
