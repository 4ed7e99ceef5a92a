// Primitives for reading and writing CSV files.

use crate::dss::{io_common::clean_header, io_common::RawTable, *};

/// Reads a CSV file with a header row. Every record is trimmed; fully empty
/// records are skipped.
pub fn read_csv_table(path: &str) -> BDssResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .map(clean_header)
        .collect();
    debug!("read_csv_table: {:?} headers: {:?}", path, headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        if line.iter().all(|s| s.is_empty()) {
            debug!("read_csv_table: skipping empty line {}", lineno);
            continue;
        }
        let mut row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        // Short rows are padded so that the missing cells are reported as empty.
        row.resize(headers.len().max(row.len()), String::new());
        rows.push(row);
    }
    Ok(RawTable {
        path: path.to_string(),
        headers,
        rows,
    })
}

fn table_writer<W: std::io::Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(w)
}

fn write_records<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    path: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> BDssResult<()> {
    wtr.write_record(headers).context(CsvWriteSnafu { path })?;
    for row in rows.iter() {
        wtr.write_record(row).context(CsvWriteSnafu { path })?;
    }
    Ok(())
}

pub fn write_csv_table(path: &str, headers: &[String], rows: &[Vec<String>]) -> BDssResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .context(CsvWriteSnafu { path })?;
    write_records(&mut wtr, path, headers, rows)?;
    wtr.flush().context(WritingFileSnafu { path })?;
    Ok(())
}

/// The exact text that `write_csv_table` produces.
pub fn render_csv_table(headers: &[String], rows: &[Vec<String>]) -> BDssResult<String> {
    let mut wtr = table_writer(Vec::new());
    write_records(&mut wtr, "<memory>", headers, rows)?;
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => {
            return Err(Box::new(DssError::WritingFile {
                source: e.into_error(),
                path: "<memory>".to_string(),
            }))
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
