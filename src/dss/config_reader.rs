use crate::args::Args;
use crate::dss::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    /// csv or xlsx
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    /// Importance ratings from 1 to 5, by criterion column name.
    pub ratings: Option<BTreeMap<String, f64>>,
    #[serde(rename = "fallbackToDefault")]
    pub fallback_to_default: Option<bool>,
    #[serde(rename = "saveNormalizedTo")]
    pub save_normalized_to: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
    #[serde(rename = "referencePath")]
    pub reference_path: Option<String>,
    #[serde(rename = "preprocessedPath")]
    pub preprocessed_path: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    /// renormalize or reject
    #[serde(rename = "weightNormalization")]
    pub weight_normalization: Option<String>,
    #[serde(rename = "wpZeroSubstitute")]
    pub wp_zero_substitute: Option<f64>,
}

impl RulesSettings {
    pub fn scoring_rules(&self) -> DssResult<ScoringRules> {
        let weight_normalization = match self.weight_normalization.as_deref() {
            None | Some("renormalize") => WeightNormalization::Renormalize,
            Some("reject") => WeightNormalization::Reject,
            Some(x) => whatever!("unknown weight normalization rule: {}", x),
        };
        let wp_zero_substitute = self.wp_zero_substitute.unwrap_or(WP_ZERO_SUBSTITUTE);
        if !(wp_zero_substitute.is_finite() && wp_zero_substitute > 0.0) {
            return Err(DssError::Ranking {
                source: RankingErrors::InvalidZeroSubstitute(wp_zero_substitute),
            });
        }
        Ok(ScoringRules {
            weight_normalization,
            wp_zero_substitute,
        })
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DssConfig {
    #[serde(rename = "inputSettings", default)]
    pub input_settings: InputSettings,
    #[serde(rename = "weightSettings", default)]
    pub weight_settings: WeightSettings,
    pub methods: Option<Vec<String>>,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub rules: RulesSettings,
}

impl DssConfig {
    /// The selected methods, all three by default.
    pub fn methods(&self) -> DssResult<Vec<Method>> {
        match &self.methods {
            None => Ok(Method::ALL.to_vec()),
            Some(names) => parse_methods(names),
        }
    }

    /// Applies the command line on top of this configuration. The flags win.
    pub fn merge_args(mut self, args: &Args) -> DssResult<DssConfig> {
        override_with(&mut self.input_settings.file_path, &args.input);
        override_with(&mut self.input_settings.provider, &args.input_type);
        override_with(
            &mut self.input_settings.excel_worksheet_name,
            &args.excel_worksheet_name,
        );

        override_with(&mut self.weight_settings.file_path, &args.weights);
        if let Some(ratings) = &args.rating {
            let mut parsed: BTreeMap<String, f64> = BTreeMap::new();
            for s in ratings.iter() {
                let (name, rating) = weights::parse_rating(s)?;
                if parsed.insert(name.clone(), rating).is_some() {
                    whatever!("criterion {} was rated twice", name);
                }
            }
            self.weight_settings.ratings = Some(parsed);
        }
        if args.fallback_weights {
            self.weight_settings.fallback_to_default = Some(true);
        }
        override_with(&mut self.weight_settings.save_normalized_to, &args.save_weights);

        if args.methods.is_some() {
            self.methods = args.methods.clone();
        }
        if args.strict_weights {
            self.rules.weight_normalization = Some("reject".to_string());
        }

        override_with(&mut self.output_settings.output_directory, &args.output_dir);
        override_with(&mut self.output_settings.summary_path, &args.out);
        override_with(&mut self.output_settings.reference_path, &args.reference);
        override_with(
            &mut self.output_settings.preprocessed_path,
            &args.preprocessed_out,
        );
        Ok(self)
    }

    fn resolve_paths(mut self, root: &Path) -> DssConfig {
        let fields = [
            &mut self.input_settings.file_path,
            &mut self.weight_settings.file_path,
            &mut self.weight_settings.save_normalized_to,
            &mut self.output_settings.output_directory,
            &mut self.output_settings.reference_path,
            &mut self.output_settings.preprocessed_path,
        ];
        for field in fields {
            if let Some(p) = field.take() {
                *field = Some(resolve_path(root, &p));
            }
        }
        // 'stdout' is not a path.
        self.output_settings.summary_path = match self.output_settings.summary_path.take() {
            Some(p) if p != "stdout" => Some(resolve_path(root, &p)),
            x => x,
        };
        self
    }
}

fn override_with(field: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        *field = value.clone();
    }
}

fn resolve_path(root: &Path, p: &str) -> String {
    if Path::new(p).is_absolute() {
        p.to_string()
    } else {
        let full: PathBuf = [root, Path::new(p)].iter().collect();
        full.display().to_string()
    }
}

pub fn parse_methods(names: &[String]) -> DssResult<Vec<Method>> {
    let mut res: Vec<Method> = Vec::new();
    for name in names.iter() {
        let m: Method = name.trim().parse().context(RankingSnafu {})?;
        res.push(m);
    }
    Ok(res)
}

/// Reads a JSON configuration. Relative paths are resolved against the
/// directory containing the configuration file.
pub fn read_config(path: &str) -> DssResult<DssConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DssConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let root = Path::new(path).parent().unwrap_or_else(|| Path::new(""));
    Ok(config.resolve_paths(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_path() -> String {
        [env!("CARGO_MANIFEST_DIR"), "tests", "data", "config_sample.json"]
            .iter()
            .collect::<PathBuf>()
            .display()
            .to_string()
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let config = read_config(&config_path()).unwrap();
        let input = config.input_settings.file_path.clone().unwrap();
        assert!(Path::new(&input).is_absolute());
        assert!(input.ends_with("scholarship_sample.csv"));
        assert!(Path::new(&input).exists());
        assert_eq!(config.output_settings.summary_path.as_deref(), Some("stdout"));
        assert_eq!(
            config.methods().unwrap(),
            vec![Method::Saw, Method::Wp, Method::Topsis]
        );
    }

    #[test]
    fn flags_override_the_file() {
        let config = read_config(&config_path()).unwrap();
        let args = Args::parse_from([
            "scholardss",
            "--methods",
            "wp,topsis",
            "--strict-weights",
            "--rating",
            "C1_GPA=5",
            "--rating",
            "C2_Certificates=2",
            "-d",
            "/tmp/elsewhere",
        ]);
        let merged = config.merge_args(&args).unwrap();
        assert_eq!(merged.methods().unwrap(), vec![Method::Wp, Method::Topsis]);
        assert_eq!(
            merged.rules.scoring_rules().unwrap().weight_normalization,
            WeightNormalization::Reject
        );
        let ratings = merged.weight_settings.ratings.unwrap();
        assert_eq!(ratings.get("C1_GPA"), Some(&5.0));
        assert_eq!(ratings.len(), 2);
        assert_eq!(
            merged.output_settings.output_directory.as_deref(),
            Some("/tmp/elsewhere")
        );
        // Untouched by the flags.
        assert!(merged.input_settings.file_path.is_some());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: DssConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DssConfig::default());
        assert_eq!(config.methods().unwrap(), Method::ALL.to_vec());
        assert_eq!(config.rules.scoring_rules().unwrap(), ScoringRules::DEFAULT_RULES);
    }

    #[test]
    fn bad_rules_are_rejected() {
        let rules = RulesSettings {
            weight_normalization: Some("sometimes".to_string()),
            wp_zero_substitute: None,
        };
        assert!(rules.scoring_rules().is_err());
        let rules = RulesSettings {
            weight_normalization: None,
            wp_zero_substitute: Some(0.0),
        };
        assert!(matches!(
            rules.scoring_rules(),
            Err(DssError::Ranking {
                source: RankingErrors::InvalidZeroSubstitute(_)
            })
        ));
        assert!(parse_methods(&["borda".to_string()]).is_err());
    }
}
