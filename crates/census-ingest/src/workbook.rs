//! Spreadsheet (`.xls` / `.xlsx`) records via calamine.

use std::io::Cursor;

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};

use crate::error::IngestError;

/// Read the first worksheet as string records.
pub(crate) fn read_workbook_records(
    filename: &str,
    bytes: &[u8],
) -> Result<Vec<Vec<String>>, IngestError> {
    let workbook_error = |message: String| IngestError::Workbook {
        filename: filename.to_string(),
        message,
    };
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|error| workbook_error(error.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook has no worksheets".to_string()))?
        .map_err(|error| workbook_error(error.to_string()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(render_cell).collect())
        .collect())
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => render_float(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|date| date.format("%m/%d/%Y").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Whole numbers lose the `.0` spreadsheets attach to them, so zip codes and
/// ids read back as typed.
fn render_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(render_float(63101.0), "63101");
        assert_eq!(render_float(-2.0), "-2");
        assert_eq!(render_float(1.5), "1.5");
    }

    #[test]
    fn cells_render_as_text() {
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::String("Jane".to_string())), "Jane");
        assert_eq!(render_cell(&Data::Int(6310)), "6310");
        assert_eq!(render_cell(&Data::Bool(true)), "true");
    }

    #[test]
    fn garbage_bytes_are_a_workbook_error() {
        let err = read_workbook_records("census.xlsx", b"not a workbook").unwrap_err();
        assert!(matches!(err, IngestError::Workbook { .. }));
    }
}
