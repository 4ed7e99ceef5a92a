use clap::Parser;

/// This is a decision support program that ranks scholarship applicants with SAW, WP and TOPSIS
/// and fuses the three rankings with a Borda count.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the run (input, weights, methods, outputs).
    /// The command line options override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The table of applicants. The first row must contain the column names: ID and
    /// the ten criteria C1_GPA ... C10_OnTime.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the only worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, optional) A CSV file with one row of weights, one column per criterion.
    /// If no weights are given, every criterion receives the same weight.
    #[clap(short, long, value_parser)]
    pub weights: Option<String>,

    /// (CRITERION=RATING, repeated) Custom importance ratings from 1 to 5, for example
    /// `--rating C1_GPA=5`. Every criterion must be rated. The ratings are normalized to sum to 1.
    #[clap(long, value_parser)]
    pub rating: Option<Vec<String>>,

    /// If passed, a weight file that cannot be read is replaced by the default uniform weights
    /// instead of stopping the program.
    #[clap(long, takes_value = false)]
    pub fallback_weights: bool,

    /// If passed, weights that do not sum to 1 are rejected instead of being normalized.
    #[clap(long, takes_value = false)]
    pub strict_weights: bool,

    /// (comma-separated list, default saw,wp,topsis) The scoring methods to run. The Borda
    /// ranking is only computed when the three methods are selected.
    #[clap(short, long, value_parser, value_delimiter = ',')]
    pub methods: Option<Vec<String>>,

    /// (directory, default `result`) Where the result tables are written.
    #[clap(short = 'd', long, value_parser)]
    pub output_dir: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a summary of the run is written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference Borda ranking in CSV format. If provided, the program checks that
    /// the computed ranking matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) If specified, the normalized weights are written to this CSV file.
    #[clap(long, value_parser)]
    pub save_weights: Option<String>,

    /// (file path) If specified, the pre-processed applicant table (income converted to its band
    /// score) is written to this CSV file.
    #[clap(long, value_parser)]
    pub preprocessed_out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
