pub use crate::config::*;
use crate::config::{check_criteria, check_row};

/// A builder for assembling a feature matrix one applicant at a time.
///
/// Rows are checked as they are added, so that an error points at the
/// offending applicant.
///
/// ```
/// pub use mcdm_ranking::builder::Builder;
/// # use mcdm_ranking::RankingErrors;
///
/// let mut builder = Builder::new(&["C1_GPA".to_string(), "C8_InterviewScore".to_string()])?;
///
/// builder.add_applicant("S-001", &[3.4, 80.0])?;
/// builder.add_applicant("S-002", &[3.9, 72.5])?;
///
/// let matrix = builder.build()?;
/// assert_eq!(matrix.num_applicants(), 2);
///
/// # Ok::<(), RankingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _criteria: Vec<String>,
    pub(crate) _applicants: Vec<(String, Vec<f64>)>,
}

impl Builder {
    pub fn new(criteria: &[String]) -> Result<Builder, RankingErrors> {
        check_criteria(criteria)?;
        Ok(Builder {
            _criteria: criteria.to_vec(),
            _applicants: Vec::new(),
        })
    }

    /// Adds an applicant with one value per criterion, in criterion order.
    pub fn add_applicant(&mut self, id: &str, values: &[f64]) -> Result<(), RankingErrors> {
        if id.trim().is_empty() {
            return Err(RankingErrors::EmptyApplicantId {
                row: self._applicants.len(),
            });
        }
        if self._applicants.iter().any(|(other, _)| other == id) {
            return Err(RankingErrors::DuplicateApplicant(id.to_string()));
        }
        check_row(&self._criteria, id, values)?;
        self._applicants.push((id.to_string(), values.to_vec()));
        Ok(())
    }

    /// Adds an applicant whose values are given by criterion name.
    ///
    /// Every criterion must be given exactly once.
    pub fn add_applicant_named(
        &mut self,
        id: &str,
        values: &[(String, f64)],
    ) -> Result<(), RankingErrors> {
        for (name, _) in values.iter() {
            if !self._criteria.contains(name) {
                return Err(RankingErrors::UnexpectedCriterion(name.clone()));
            }
        }
        let mut row: Vec<f64> = Vec::with_capacity(self._criteria.len());
        for c in self._criteria.iter() {
            let mut matches = values.iter().filter(|(name, _)| name == c);
            match (matches.next(), matches.next()) {
                (Some((_, v)), None) => row.push(*v),
                (Some(_), Some(_)) => return Err(RankingErrors::DuplicateCriterion(c.clone())),
                (None, _) => return Err(RankingErrors::MissingCriterion(c.clone())),
            }
        }
        self.add_applicant(id, &row)
    }

    pub fn build(self) -> Result<FeatureMatrix, RankingErrors> {
        FeatureMatrix::new(self._criteria, self._applicants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Vec<String> {
        vec!["C1".to_string(), "C2".to_string()]
    }

    #[test]
    fn rejects_bad_rows() {
        let mut b = Builder::new(&criteria()).unwrap();
        b.add_applicant("A", &[1.0, 2.0]).unwrap();
        assert_eq!(
            b.add_applicant("A", &[1.0, 2.0]),
            Err(RankingErrors::DuplicateApplicant("A".to_string()))
        );
        assert_eq!(
            b.add_applicant(" ", &[1.0, 2.0]),
            Err(RankingErrors::EmptyApplicantId { row: 1 })
        );
        assert_eq!(
            b.add_applicant("B", &[1.0]),
            Err(RankingErrors::RowLength {
                id: "B".to_string(),
                expected: 2,
                found: 1
            })
        );
        assert!(matches!(
            b.add_applicant("B", &[1.0, f64::NAN]),
            Err(RankingErrors::InvalidValue { .. })
        ));
        assert!(matches!(
            b.add_applicant("B", &[-1.0, 2.0]),
            Err(RankingErrors::InvalidValue { .. })
        ));
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(Builder::new(&[]).err(), Some(RankingErrors::EmptyMatrix));
        let b = Builder::new(&criteria()).unwrap();
        assert_eq!(b.build(), Err(RankingErrors::EmptyMatrix));
        assert_eq!(
            Builder::new(&["C1".to_string(), "C1".to_string()]).err(),
            Some(RankingErrors::DuplicateCriterion("C1".to_string()))
        );
    }

    #[test]
    fn named_values_are_aligned() {
        let mut b = Builder::new(&criteria()).unwrap();
        b.add_applicant_named("A", &[("C2".to_string(), 5.0), ("C1".to_string(), 10.0)])
            .unwrap();
        assert_eq!(
            b.add_applicant_named("B", &[("C2".to_string(), 5.0)]),
            Err(RankingErrors::MissingCriterion("C1".to_string()))
        );
        assert_eq!(
            b.add_applicant_named("B", &[("C3".to_string(), 5.0)]),
            Err(RankingErrors::UnexpectedCriterion("C3".to_string()))
        );
        let m = b.build().unwrap();
        assert_eq!(m.rows(), &[vec![10.0, 5.0]]);
    }
}
