use std::path::Path;

/// A table as read from a file: the header row and the data rows, all as text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub path: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Header cells sometimes carry a byte order mark or stray spaces.
pub fn clean_header(s: &str) -> String {
    s.trim_start_matches('\u{feff}').trim().to_string()
}

pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_and_numbers() {
        assert_eq!(clean_header("\u{feff}C1_GPA "), "C1_GPA");
        assert_eq!(parse_number(" 3.85"), Some(3.85));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("3,5"), None);
        assert_eq!(simplify_file_name("/data/in/applicants.csv"), "applicants.csv");
    }
}
