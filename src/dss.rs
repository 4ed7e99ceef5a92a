use log::{debug, info, warn};

use mcdm_ranking::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use crate::args::Args;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;
mod report;
pub mod schema;
pub mod weights;

use crate::dss::config_reader::*;
use crate::dss::io_common::RawTable;
use crate::dss::schema::ApplicantTable;
use crate::dss::weights::WeightSource;

#[derive(Debug, Snafu)]
pub enum DssError {
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("No worksheet named {name} in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "Several worksheets found in {path} ({}), use --excel-worksheet-name",
        names.join(", ")
    ))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("Could not understand the cell at line {lineno}, column {column}: {content}"))]
    ExcelWrongCellType {
        lineno: usize,
        column: usize,
        content: String,
    },
    #[snafu(display("{path} contains no data row"))]
    EmptyTable { path: String },
    #[snafu(display("Line {lineno} has {found} cells but the header has {expected} columns"))]
    RowLength {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Missing columns: {}", missing.join(", ")))]
    MissingColumns { missing: Vec<String> },
    #[snafu(display("Dataset contains missing values in: {}", columns.join(", ")))]
    MissingValues { columns: Vec<String> },
    #[snafu(display("Line {lineno}: value {content:?} of {column} is not a number"))]
    NotANumber {
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Invalid rating {content:?}: expected CRITERION=RATING with a rating from 1 to 5"))]
    InvalidRating { content: String },
    #[snafu(display("Unknown criterion {name}"))]
    UnknownCriterion { name: String },
    #[snafu(display("Error opening {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error reading {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Ranking error: {source}"))]
    Ranking {
        source: mcdm_ranking::RankingErrors,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DssResult<T> = Result<T, DssError>;
pub type BDssResult<T> = Result<T, Box<DssError>>;

/// What a run produced. Mostly useful for tests and for the summary.
#[derive(Debug)]
pub struct RunReport {
    pub weight_source: WeightSource,
    pub outcome: ScoringOutcome,
    /// The paths of all the files written.
    pub artifacts: Vec<String>,
}

fn read_applicant_table(settings: &InputSettings) -> DssResult<RawTable> {
    let path = match &settings.file_path {
        Some(p) => p.clone(),
        None => whatever!("No input file provided: use --input or the inputSettings of the configuration"),
    };
    info!("Attempting to read applicant file {:?}", path);
    let provider = settings.provider.clone().unwrap_or_else(|| "csv".to_string());
    let res = match provider.as_str() {
        "csv" => io_csv::read_csv_table(&path),
        "xlsx" | "excel" => io_xlsx::read_excel_table(&path, settings.excel_worksheet_name.clone()),
        x => whatever!("Input type not implemented {:?}", x),
    };
    res.map_err(|e| *e)
}

/// Runs the scoring described by the configuration and writes all the outputs.
pub fn run_config(config: &DssConfig) -> DssResult<RunReport> {
    info!("config: {:?}", config);

    // Everything that can be rejected without reading the data is checked first.
    let methods = config.methods()?;
    let rules = config.rules.scoring_rules()?;

    let raw = read_applicant_table(&config.input_settings)?;
    let table: ApplicantTable = schema::prepare_applicants(raw)?;
    info!(
        "Read {} applicants with {} columns",
        table.rows.len(),
        table.headers.len()
    );

    let mut artifacts: Vec<String> = Vec::new();
    if let Some(p) = &config.output_settings.preprocessed_path {
        io_csv::write_csv_table(p, &table.headers, &table.rows).map_err(|e| *e)?;
        info!("Pre-processed table saved as {}", p);
        artifacts.push(p.clone());
    }

    let loaded = weights::resolve_weights(&config.weight_settings)?;
    for line in weights::weights_report(&loaded.weights) {
        info!("{}", line);
    }
    if let Some(p) = &config.weight_settings.save_normalized_to {
        weights::save_weights(p, &loaded.weights.normalized().context(RankingSnafu {})?)?;
        info!("Weights saved to {}", p);
        artifacts.push(p.clone());
    }

    let outcome = run_scoring(&table.matrix, &loaded.weights, &methods, &rules)
        .context(RankingSnafu {})?;

    let output_dir = config
        .output_settings
        .output_directory
        .clone()
        .unwrap_or_else(|| "result".to_string());
    fs::create_dir_all(&output_dir).context(WritingFileSnafu {
        path: output_dir.clone(),
    })?;

    for column in outcome.scores.iter() {
        let (headers, rows) = report::method_table(&table, column);
        let p = artifact_path(&output_dir, &column.method.artifact_name());
        io_csv::write_csv_table(&p, &headers, &rows).map_err(|e| *e)?;
        info!("{} result saved as {}", column.method, p);
        artifacts.push(p);
    }

    let borda_csv = match &outcome.borda {
        Some(borda) => {
            let (headers, rows) = report::borda_table(borda);
            let p = artifact_path(&output_dir, "borda_result");
            io_csv::write_csv_table(&p, &headers, &rows).map_err(|e| *e)?;
            info!("Borda ranking saved as {}", p);
            artifacts.push(p);
            Some(io_csv::render_csv_table(&headers, &rows).map_err(|e| *e)?)
        }
        None => {
            warn!("SAW, WP and TOPSIS are not all selected: no Borda ranking produced");
            None
        }
    };

    if let Some(out) = &config.output_settings.summary_path {
        let summary_js = report::build_summary_js(config, &loaded.source, &outcome);
        let pretty_js =
            serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
        if out == "stdout" {
            println!("{}", pretty_js);
        } else {
            fs::write(out, pretty_js).context(WritingFileSnafu { path: out.clone() })?;
            artifacts.push(out.clone());
        }
    }

    // The reference ranking, if provided for comparison
    if let Some(reference_p) = &config.output_settings.reference_path {
        match &borda_csv {
            Some(computed) => report::check_reference(reference_p, computed)?,
            None => whatever!("A reference ranking was given but no Borda ranking was computed"),
        }
    }

    debug!("run_config: artifacts: {:?}", artifacts);
    Ok(RunReport {
        weight_source: loaded.source,
        outcome,
        artifacts,
    })
}

fn artifact_path(output_dir: &str, name: &str) -> String {
    Path::new(output_dir)
        .join(format!("{}.csv", name))
        .display()
        .to_string()
}

pub fn run(args: &Args) -> DssResult<()> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => DssConfig::default(),
    };
    let config = config.merge_args(args)?;
    let report = run_config(&config)?;
    info!("Weights used: {}", report.weight_source.describe());
    for p in report.artifacts.iter() {
        info!("Wrote {}", p);
    }

    // Short text summary for the terminal.
    match &report.outcome.borda {
        Some(borda) => {
            println!("Final ranking (Borda):");
            for (pos, e) in borda.entries.iter().enumerate() {
                let ranks: Vec<String> = e
                    .ranks
                    .iter()
                    .map(|(m, r)| format!("{} {}", m, r))
                    .collect();
                println!("{:>4}. {} ({}) [{}]", pos + 1, e.id, e.score, ranks.join(", "));
            }
        }
        None => {
            for column in report.outcome.scores.iter() {
                println!("{} ranking:", column.method);
                for (pos, e) in column.sorted_desc().iter().enumerate() {
                    println!("{:>4}. {} ({})", pos + 1, e.id, e.score);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn data_path(name: &str) -> String {
        [env!("CARGO_MANIFEST_DIR"), "tests", "data", name]
            .iter()
            .collect::<PathBuf>()
            .display()
            .to_string()
    }

    fn scratch_dir(test_name: &str) -> String {
        let p = std::env::temp_dir().join(format!("scholarship-dss-{}", test_name));
        let _ = fs::remove_dir_all(&p);
        p.display().to_string()
    }

    fn sample_config(test_name: &str) -> DssConfig {
        let mut config = DssConfig::default();
        config.input_settings.file_path = Some(data_path("scholarship_sample.csv"));
        config.weight_settings.file_path = Some(data_path("weight_default.csv"));
        config.output_settings.output_directory = Some(scratch_dir(test_name));
        config
    }

    #[test]
    fn sample_matches_reference() {
        init();
        let mut config = sample_config("reference");
        config.output_settings.reference_path = Some(data_path("borda_expected.csv"));
        let report = run_config(&config).unwrap();
        assert_eq!(report.weight_source, WeightSource::File(data_path("weight_default.csv")));
        assert_eq!(report.artifacts.len(), 4);
        for p in report.artifacts.iter() {
            assert!(Path::new(p).exists(), "{} not written", p);
        }
        let borda = report.outcome.borda.unwrap();
        assert_eq!(borda.entries[0].id, "S001");
        assert_eq!(borda.entries[0].score, 26);
    }

    #[test]
    fn method_artifacts_keep_all_columns() {
        init();
        let config = sample_config("columns");
        let report = run_config(&config).unwrap();
        let saw_p = report
            .artifacts
            .iter()
            .find(|p| p.ends_with("saw_result.csv"))
            .unwrap();
        let table = io_csv::read_csv_table(saw_p).unwrap();
        assert_eq!(table.headers.len(), 13);
        assert_eq!(table.headers[1], "Name");
        assert_eq!(table.headers[12], "SAW_Score");
        // Best first, income already converted to its band score.
        assert_eq!(table.rows[0][0], "S001");
        assert_eq!(table.rows[0][4], "4");
    }

    #[test]
    fn partial_selection_skips_borda() {
        init();
        let mut config = sample_config("partial");
        config.methods = Some(vec!["topsis".to_string(), "saw".to_string()]);
        let report = run_config(&config).unwrap();
        assert!(report.outcome.borda.is_none());
        let methods: Vec<Method> = report.outcome.scores.iter().map(|c| c.method).collect();
        assert_eq!(methods, vec![Method::Saw, Method::Topsis]);

        config.output_settings.reference_path = Some(data_path("borda_expected.csv"));
        assert!(run_config(&config).is_err());
    }

    #[test]
    fn reference_mismatch_fails() {
        init();
        let dir = scratch_dir("mismatch");
        let mut config = sample_config("mismatch-out");
        fs::create_dir_all(&dir).unwrap();
        let reference = Path::new(&dir).join("borda_wrong.csv");
        fs::write(&reference, "ID,Rank_SAW,Rank_WP,Rank_TOPSIS,Borda_Score\nS004,1,1,1,27\n").unwrap();
        config.output_settings.reference_path = Some(reference.display().to_string());
        assert!(matches!(run_config(&config), Err(DssError::Whatever { .. })));
    }

    #[test]
    fn missing_weights_fall_back_to_uniform() {
        init();
        let mut config = sample_config("uniform");
        config.weight_settings.file_path = None;
        let report = run_config(&config).unwrap();
        assert_eq!(report.weight_source, WeightSource::Fallback);
        assert!(report.outcome.weights.is_normalized());
        assert_eq!(report.outcome.weights.get("C1_GPA"), Some(0.1));
    }

    #[test]
    fn unreadable_weights_fail_unless_fallback() {
        init();
        let mut config = sample_config("no-fallback");
        config.weight_settings.file_path = Some(data_path("does_not_exist.csv"));
        assert!(matches!(run_config(&config), Err(DssError::CsvOpen { .. })));

        config.weight_settings.fallback_to_default = Some(true);
        let report = run_config(&config).unwrap();
        assert_eq!(report.weight_source, WeightSource::Fallback);
    }

    #[test]
    fn strict_rules_reject_raw_weights() {
        init();
        let dir = scratch_dir("strict");
        fs::create_dir_all(&dir).unwrap();
        let weights_p = Path::new(&dir).join("weights_raw.csv");
        fs::write(
            &weights_p,
            "C1_GPA,C2_Certificates,C3_ParentIncomeIDR,C4_Dependents,C5_OrgScore,C6_VolunteerEvents,C7_LetterScore,C8_InterviewScore,C9_DocComplete,C10_OnTime\n5,3,4,3,3,2,2,4,1,1\n",
        )
        .unwrap();
        let mut config = sample_config("strict-out");
        config.weight_settings.file_path = Some(weights_p.display().to_string());
        config.rules.weight_normalization = Some("reject".to_string());
        assert!(matches!(
            run_config(&config),
            Err(DssError::Ranking {
                source: RankingErrors::UnnormalizedWeights { .. }
            })
        ));

        config.rules.weight_normalization = None;
        let report = run_config(&config).unwrap();
        assert!(report.outcome.weights.is_normalized());
    }

    #[test]
    fn long_row_stops_before_any_output() {
        init();
        let dir = scratch_dir("long-row");
        fs::create_dir_all(&dir).unwrap();
        let sample = fs::read_to_string(data_path("scholarship_sample.csv")).unwrap();
        let input = Path::new(&dir).join("applicants.csv");
        fs::write(&input, format!("{},extra\n", sample.trim_end())).unwrap();

        let mut config = sample_config("long-row-out");
        config.input_settings.file_path = Some(input.display().to_string());
        let out_dir = config.output_settings.output_directory.clone().unwrap();
        match run_config(&config) {
            Err(DssError::RowLength { lineno, .. }) => assert_eq!(lineno, 11),
            x => panic!("unexpected {:?}", x.map(|r| r.artifacts)),
        }
        assert!(!Path::new(&out_dir).join("saw_result.csv").exists());
    }

    #[test]
    fn missing_input_is_reported() {
        let mut config = sample_config("no-input");
        config.input_settings.file_path = None;
        assert!(matches!(run_config(&config), Err(DssError::Whatever { .. })));
    }
}
