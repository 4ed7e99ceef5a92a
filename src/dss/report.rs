use serde::Serialize;
use serde_json::{json, Value as JSValue};
use text_diff::print_diff;

use crate::dss::config_reader::DssConfig;
use crate::dss::io_common::simplify_file_name;
use crate::dss::schema::ApplicantTable;
use crate::dss::weights::WeightSource;
use crate::dss::*;

/// The input table with the score of the method appended, best first.
pub fn method_table(table: &ApplicantTable, column: &ScoreColumn) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = table.headers.clone();
    headers.push(column.method.score_column());
    let rows: Vec<Vec<String>> = column
        .sorted_desc()
        .iter()
        .map(|e| {
            let mut row = table.rows[e.row].clone();
            row.push(e.score.to_string());
            row
        })
        .collect();
    (headers, rows)
}

pub fn borda_table(borda: &BordaTable) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec!["ID".to_string()];
    headers.extend(Method::ALL.iter().map(|m| m.rank_column()));
    headers.push("Borda_Score".to_string());
    let rows: Vec<Vec<String>> = borda
        .entries
        .iter()
        .map(|e| {
            let mut row = vec![e.id.clone()];
            for m in Method::ALL.iter() {
                let rank = e
                    .ranks
                    .iter()
                    .find(|(method, _)| method == m)
                    .map(|(_, r)| r.to_string())
                    .unwrap_or_default();
                row.push(rank);
            }
            row.push(e.score.to_string());
            row
        })
        .collect();
    (headers, rows)
}

#[derive(Debug, Clone, Serialize)]
struct RankedApplicant {
    id: String,
    score: f64,
    rank: u32,
}

fn method_summary(outcome: &ScoringOutcome) -> Vec<JSValue> {
    outcome
        .scores
        .iter()
        .zip(outcome.ranks.iter())
        .map(|(scores, ranks)| {
            let ranking: Vec<RankedApplicant> = scores
                .sorted_desc()
                .into_iter()
                .map(|e| RankedApplicant {
                    rank: ranks.rank_of(&e.id).unwrap_or_default(),
                    id: e.id,
                    score: e.score,
                })
                .collect();
            json!({
                "method": scores.method.name(),
                "best": ranking.first().map(|r| r.id.clone()),
                "ranking": ranking,
            })
        })
        .collect()
}

fn borda_summary(borda: &BordaTable) -> JSValue {
    let ranking: Vec<JSValue> = borda
        .entries
        .iter()
        .enumerate()
        .map(|(pos, e)| {
            let ranks: serde_json::Map<String, JSValue> = e
                .ranks
                .iter()
                .map(|(m, r)| (m.name().to_string(), json!(r)))
                .collect();
            json!({
                "position": pos + 1,
                "id": e.id,
                "ranks": ranks,
                "bordaScore": e.score,
            })
        })
        .collect();
    json!({
        "numApplicants": borda.num_applicants,
        "ranking": ranking,
    })
}

pub fn build_summary_js(
    config: &DssConfig,
    weight_source: &WeightSource,
    outcome: &ScoringOutcome,
) -> JSValue {
    let input = config
        .input_settings
        .file_path
        .as_deref()
        .map(simplify_file_name);
    let weights: serde_json::Map<String, JSValue> = outcome
        .weights
        .entries()
        .iter()
        .map(|(n, w)| (n.clone(), json!(w)))
        .collect();
    let methods: Vec<&str> = outcome.scores.iter().map(|c| c.method.name()).collect();
    json!({
        "input": input,
        "weights": {
            "source": weight_source.describe(),
            "values": weights,
        },
        "methods": methods,
        "results": method_summary(outcome),
        "borda": outcome.borda.as_ref().map(borda_summary),
    })
}

/// Compares the computed Borda table with a reference file. Line endings are
/// not significant.
pub fn check_reference(path: &str, computed: &str) -> DssResult<()> {
    let reference = fs::read_to_string(path).context(ReadingFileSnafu { path })?;
    let reference = reference.replace("\r\n", "\n");
    let computed = computed.replace("\r\n", "\n");
    if reference.trim_end() != computed.trim_end() {
        warn!("Found differences with the reference ranking");
        print_diff(reference.as_str(), computed.as_str(), "\n");
        whatever!("Difference detected between calculated ranking and reference ranking")
    }
    info!("The ranking matches the reference {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcdm_ranking::builder::Builder;

    fn outcome() -> (ApplicantTable, ScoringOutcome) {
        let criteria = vec!["C1".to_string(), "C2".to_string()];
        let mut b = Builder::new(&criteria).unwrap();
        b.add_applicant("A", &[2.0, 3.0]).unwrap();
        b.add_applicant("B", &[4.0, 1.0]).unwrap();
        b.add_applicant("C", &[1.0, 1.0]).unwrap();
        let matrix = b.build().unwrap();
        let weights = WeightVector::new(vec![
            ("C1".to_string(), 0.5),
            ("C2".to_string(), 0.5),
        ])
        .unwrap();
        let outcome =
            run_scoring(&matrix, &weights, &Method::ALL, &ScoringRules::DEFAULT_RULES).unwrap();
        let table = ApplicantTable {
            headers: vec!["ID".to_string(), "C1".to_string(), "C2".to_string()],
            rows: vec![
                vec!["A".to_string(), "2".to_string(), "3".to_string()],
                vec!["B".to_string(), "4".to_string(), "1".to_string()],
                vec!["C".to_string(), "1".to_string(), "1".to_string()],
            ],
            matrix,
        };
        (table, outcome)
    }

    #[test]
    fn method_tables_are_sorted() {
        let (table, outcome) = outcome();
        let saw = &outcome.scores[0];
        let (headers, rows) = method_table(&table, saw);
        assert_eq!(headers, vec!["ID", "C1", "C2", "SAW_Score"]);
        // A: 0.5 * 0.5 + 0.5 * 1 = 0.75, B: 0.5 + 0.5 / 3, C: 0.125 + 0.5 / 3
        assert_eq!(rows[0][0], "A");
        assert_eq!(rows[0][3], "0.75");
        assert_eq!(rows[2][0], "C");
        assert_eq!(rows[2][1], "1");
    }

    #[test]
    fn borda_columns() {
        let (_, outcome) = outcome();
        let (headers, rows) = borda_table(outcome.borda.as_ref().unwrap());
        assert_eq!(
            headers,
            vec!["ID", "Rank_SAW", "Rank_WP", "Rank_TOPSIS", "Borda_Score"]
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], "C");
        assert_eq!(rows[2][1..], ["3", "3", "3", "0"]);
    }

    #[test]
    fn summary() {
        let (_, outcome) = outcome();
        let mut config = DssConfig::default();
        config.input_settings.file_path = Some("/data/applicants.csv".to_string());
        let js = build_summary_js(&config, &WeightSource::Fallback, &outcome);
        assert_eq!(js["input"], "applicants.csv");
        assert_eq!(js["methods"], json!(["SAW", "WP", "TOPSIS"]));
        assert_eq!(js["results"][0]["best"], "A");
        assert_eq!(js["results"][0]["ranking"][2]["rank"], 3);
        assert_eq!(js["borda"]["numApplicants"], 3);
        assert_eq!(js["borda"]["ranking"][2]["bordaScore"], 0);
        assert_eq!(js["weights"]["values"]["C1"], 0.5);
    }

    #[test]
    fn reference_ignores_line_endings() {
        let dir = std::env::temp_dir().join("scholarship-dss-report");
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join("reference.csv").display().to_string();
        fs::write(&p, "ID,Borda_Score\r\nA,2\r\n").unwrap();
        assert!(check_reference(&p, "ID,Borda_Score\nA,2\n").is_ok());
        assert!(check_reference(&p, "ID,Borda_Score\nA,3\n").is_err());
        assert!(check_reference("/does/not/exist.csv", "").is_err());
    }
}
