use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::dss::{io_common::clean_header, io_common::RawTable, *};

/// Reads the applicant table from an Excel workbook. The first row holds the
/// column names.
pub fn read_excel_table(path: &str, worksheet_name: Option<String>) -> BDssResult<RawTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyTableSnafu { path })?;
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(column, cell)| read_cell(cell, 1, column + 1).map(|s| clean_header(&s)))
        .collect::<DssResult<Vec<String>>>()?;
    debug!("read_excel_table: headers: {:?}", headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(column, cell)| read_cell(cell, lineno, column + 1))
            .collect::<DssResult<Vec<String>>>()?;
        if cells.iter().all(|s| s.is_empty()) {
            continue;
        }
        debug!("read_excel_table: lineno: {:?} row: {:?}", lineno, cells);
        rows.push(cells);
    }
    Ok(RawTable {
        path: path.to_string(),
        headers,
        rows,
    })
}

fn read_cell(cell: &DataType, lineno: usize, column: usize) -> DssResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Empty => Ok(String::new()),
        _ => Err(DssError::ExcelWrongCellType {
            lineno,
            column,
            content: format!("{:?}", cell),
        }),
    }
}

fn get_range(path: &str, worksheet_name_o: Option<String>) -> BDssResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(DssError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using the only worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => Err(Box::new(DssError::AmbiguousWorksheet {
                path: path.to_string(),
                names: all_worksheets.iter().map(|(n, _)| n.clone()).collect(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_to_text() {
        assert_eq!(read_cell(&DataType::Float(3.85), 2, 3).unwrap(), "3.85");
        assert_eq!(read_cell(&DataType::Float(3500000.0), 2, 5).unwrap(), "3500000");
        assert_eq!(read_cell(&DataType::Int(4), 2, 4).unwrap(), "4");
        assert_eq!(
            read_cell(&DataType::String(" 3,500,000 ".to_string()), 2, 5).unwrap(),
            "3,500,000"
        );
        assert_eq!(read_cell(&DataType::Empty, 2, 1).unwrap(), "");
        assert!(matches!(
            read_cell(&DataType::Bool(true), 7, 2),
            Err(DssError::ExcelWrongCellType {
                lineno: 7,
                column: 2,
                ..
            })
        ));
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_table("/does/not/exist.xlsx", None);
        assert!(matches!(
            res.map_err(|e| *e),
            Err(DssError::OpeningExcel { .. })
        ));
    }
}
