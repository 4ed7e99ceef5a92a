//! The applicant table: expected columns, validation and the conversion of
//! the parent income into a band score.

use mcdm_ranking::builder::Builder;

use crate::dss::{io_common::parse_number, io_common::RawTable, *};

pub const ID_COLUMN: &str = "ID";

/// The ten scoring criteria, in table order. All of them are benefit criteria.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Criterion {
    Gpa,
    Certificates,
    ParentIncome,
    Dependents,
    OrgScore,
    VolunteerEvents,
    LetterScore,
    InterviewScore,
    DocComplete,
    OnTime,
}

impl Criterion {
    pub const ALL: [Criterion; 10] = [
        Criterion::Gpa,
        Criterion::Certificates,
        Criterion::ParentIncome,
        Criterion::Dependents,
        Criterion::OrgScore,
        Criterion::VolunteerEvents,
        Criterion::LetterScore,
        Criterion::InterviewScore,
        Criterion::DocComplete,
        Criterion::OnTime,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Criterion::Gpa => "C1_GPA",
            Criterion::Certificates => "C2_Certificates",
            Criterion::ParentIncome => "C3_ParentIncomeIDR",
            Criterion::Dependents => "C4_Dependents",
            Criterion::OrgScore => "C5_OrgScore",
            Criterion::VolunteerEvents => "C6_VolunteerEvents",
            Criterion::LetterScore => "C7_LetterScore",
            Criterion::InterviewScore => "C8_InterviewScore",
            Criterion::DocComplete => "C9_DocComplete",
            Criterion::OnTime => "C10_OnTime",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Criterion::Gpa => "Grade Point Average - Academic performance indicator",
            Criterion::Certificates => "Academic certificates and achievements",
            Criterion::ParentIncome => "Parent income in Indonesian Rupiah (financial need)",
            Criterion::Dependents => "Number of family dependents",
            Criterion::OrgScore => "Organizational involvement score",
            Criterion::VolunteerEvents => "Volunteer activities and community service",
            Criterion::LetterScore => "Recommendation letter quality score",
            Criterion::InterviewScore => "Interview performance score",
            Criterion::DocComplete => "Document completeness score",
            Criterion::OnTime => "Application submission timeliness",
        }
    }

    /// The column name without its `C<n>_` prefix: `C1_GPA` gives `GPA`.
    pub fn label(&self) -> String {
        let name = self.column_name();
        let rest = name.trim_start_matches('C').trim_start_matches(|c: char| c.is_ascii_digit());
        rest.trim_start_matches('_').replace('_', " ").trim().to_string()
    }

    pub fn from_column_name(name: &str) -> Option<Criterion> {
        Criterion::ALL.iter().copied().find(|c| c.column_name() == name)
    }

    pub fn column_names() -> Vec<String> {
        Criterion::ALL
            .iter()
            .map(|c| c.column_name().to_string())
            .collect()
    }
}

/// Maps a monthly parent income (IDR) to its band score. The 4 to 6 million
/// band gets the highest score.
pub fn income_band_score(idr: f64) -> u32 {
    if idr < 4_000_000.0 {
        4
    } else if idr < 6_000_000.0 {
        5
    } else if idr < 10_000_000.0 {
        3
    } else if idr < 20_000_000.0 {
        2
    } else {
        1
    }
}

/// Reads an income written with thousand separators or a currency symbol,
/// such as `Rp 3,500,000`.
pub fn parse_income(s: &str) -> Option<f64> {
    let digits: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    parse_number(&digits)
}

/// The validated applicant table.
#[derive(Debug, Clone)]
pub struct ApplicantTable {
    /// All the columns of the input, in input order.
    pub headers: Vec<String>,
    /// The input rows, with the income replaced by its band score.
    pub rows: Vec<Vec<String>>,
    /// The ten criteria of every applicant, keyed by ID.
    pub matrix: FeatureMatrix,
}

/// Checks the table against the expected columns, converts the income and
/// builds the feature matrix. Nothing is scored if any check fails.
pub fn prepare_applicants(raw: RawTable) -> DssResult<ApplicantTable> {
    let mut expected: Vec<String> = vec![ID_COLUMN.to_string()];
    expected.extend(Criterion::column_names());
    let missing: Vec<String> = expected
        .iter()
        .filter(|c| raw.column_index(c).is_none())
        .cloned()
        .collect();
    ensure!(missing.is_empty(), MissingColumnsSnafu { missing });

    ensure!(
        !raw.rows.is_empty(),
        EmptyTableSnafu {
            path: raw.path.clone()
        }
    );

    // Short rows are padded by the readers, longer rows have no column to go to.
    if let Some((row_idx, row)) = raw
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() > raw.headers.len())
    {
        return RowLengthSnafu {
            lineno: row_idx + 2,
            expected: raw.headers.len(),
            found: row.len(),
        }
        .fail();
    }

    let with_empty: Vec<String> = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| {
            raw.rows
                .iter()
                .any(|row| row.get(*idx).map(|s| s.is_empty()).unwrap_or(true))
        })
        .map(|(_, h)| h.clone())
        .collect();
    ensure!(
        with_empty.is_empty(),
        MissingValuesSnafu {
            columns: with_empty
        }
    );

    // The missing columns check guarantees that all the lookups succeed.
    let id_idx = raw.column_index(ID_COLUMN).unwrap_or_default();
    let criterion_idxs: Vec<(Criterion, usize)> = Criterion::ALL
        .iter()
        .filter_map(|c| raw.column_index(c.column_name()).map(|idx| (*c, idx)))
        .collect();

    let mut builder = Builder::new(&Criterion::column_names()).context(RankingSnafu {})?;
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(raw.rows.len());
    for (row_idx, mut row) in raw.rows.into_iter().enumerate() {
        let lineno = row_idx + 2;
        let mut values: Vec<(String, f64)> = Vec::with_capacity(criterion_idxs.len());
        for (criterion, idx) in criterion_idxs.iter() {
            let cell = &row[*idx];
            let value = match criterion {
                Criterion::ParentIncome => parse_income(cell).map(|x| income_band_score(x) as f64),
                _ => parse_number(cell),
            };
            let value = value.context(NotANumberSnafu {
                lineno,
                column: criterion.column_name(),
                content: cell.clone(),
            })?;
            if *criterion == Criterion::ParentIncome {
                row[*idx] = value.to_string();
            }
            values.push((criterion.column_name().to_string(), value));
        }
        debug!("prepare_applicants: {} {:?}", row[id_idx], values);
        builder
            .add_applicant_named(&row[id_idx], &values)
            .context(RankingSnafu {})?;
        rows.push(row);
    }
    let matrix = builder.build().context(RankingSnafu {})?;

    Ok(ApplicantTable {
        headers: raw.headers,
        rows,
        matrix,
    })
}
