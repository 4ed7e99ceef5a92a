/*!

This is the long-form manual for `mcdm_ranking` and `scholardss`.

## Scoring methods

All the criteria are benefit criteria: a larger value is always better. The
values of the feature matrix must be finite and non-negative.

### SAW (Simple Additive Weighting)

Each criterion column is divided by its maximum, then the score of an
applicant is the weighted sum of its normalized values. A column that is zero
for every applicant cannot be normalized and stops the scoring with
`DegenerateColumn`.

### WP (Weighted Product)

The score is the product of the values raised to the power of their weights,
computed as `exp(sum_j w_j * ln(x_j))`. A value of exactly zero is replaced by
`1e-6` before taking the logarithm. This is an approximation: an applicant
with a zero value is strongly penalized but does not get a score of zero, and
it can still be ranked above another applicant with several very small
values. The substitute is configured with `ScoringRules::wp_zero_substitute`.

### TOPSIS

Each criterion column is divided by its Euclidean norm and multiplied by its
weight. The ideal-best applicant takes the column maximums, the ideal-worst
applicant the column minimums. The score is `d- / (d+ + d-)` where `d+` and `d-`
are the Euclidean distances to the ideal-best and ideal-worst applicants. When
both distances are zero (for example when all the applicants are identical, or
when there is a single applicant) the score is undefined and the scoring
stops with `DegenerateDistance`.

## Ranks

Ranks start at 1 for the best score. Applicants with the same score share the
lowest rank of their group, and the next rank is skipped:

| score | rank |
|-------|------|
| 0.8   | 1    |
| 0.8   | 1    |
| 0.64  | 3    |

## Borda fusion

The fused score of an applicant is `sum over the methods of (N - rank)`, where
`N` is the number of applicants. All three methods must have ranked exactly the
same applicants: a missing or unexpected applicant stops the fusion with
`MismatchedApplicants` instead of silently dropping rows. Applicants with the
same fused score keep the order of the first rank column.

## Weights

Weights are matched to the criteria by name. A weight vector must name every
criterion of the matrix and nothing else. `run_scoring` expects weights that
sum to 1 (within `1e-3`); with the default rules other weights are divided by
their sum with a warning, with `WeightNormalization::Reject` they are refused.

## Input formats (`scholardss`)

The applicant table is a CSV file (`csv`, the default) or an Excel workbook
(`xlsx`). The first row holds the column names. The expected columns are:

| column               | description                                          |
|----------------------|------------------------------------------------------|
| `ID`                 | unique identifier of the applicant                   |
| `C1_GPA`             | Grade Point Average - Academic performance indicator |
| `C2_Certificates`    | Academic certificates and achievements               |
| `C3_ParentIncomeIDR` | Parent income in Indonesian Rupiah (financial need)  |
| `C4_Dependents`      | Number of family dependents                          |
| `C5_OrgScore`        | Organizational involvement score                     |
| `C6_VolunteerEvents` | Volunteer activities and community service           |
| `C7_LetterScore`     | Recommendation letter quality score                  |
| `C8_InterviewScore`  | Interview performance score                          |
| `C9_DocComplete`     | Document completeness score                          |
| `C10_OnTime`         | Application submission timeliness                    |

Other columns are kept in the result tables but not scored. Empty cells are
rejected. The parent income is converted to a band score before scoring:

| monthly income (IDR)     | score |
|--------------------------|-------|
| below 4,000,000          | 4     |
| 4,000,000 to 5,999,999   | 5     |
| 6,000,000 to 9,999,999   | 3     |
| 10,000,000 to 19,999,999 | 2     |
| 20,000,000 and above     | 1     |

Thousand separators and currency symbols in the income column are ignored.

The weight file is a CSV file with one header row naming the criteria and one
row of weights. Custom ratings can be given instead with `--rating C1_GPA=5`
(one rating from 1 to 5 per criterion).

## Outputs

In the output directory:
- `saw_result.csv`, `wp_result.csv`, `topsis_result.csv`: the applicant table
  with a `SAW_Score` / `WP_Score` / `TOPSIS_Score` column, best first
- `borda_result.csv`: `ID, Rank_SAW, Rank_WP, Rank_TOPSIS, Borda_Score`, best
  first. Only written when the three methods are selected.

## Configuration

All the options can also be provided in a JSON file with `--config`:

```json
{
  "inputSettings": { "filePath": "applicants.csv", "provider": "csv" },
  "weightSettings": { "filePath": "weight_default.csv" },
  "methods": ["saw", "wp", "topsis"],
  "outputSettings": { "outputDirectory": "result" },
  "rules": { "weightNormalization": "renormalize" }
}
```

Relative paths are resolved against the directory of the configuration file.
Command line flags take precedence over the configuration file.
*/
