use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::table::CensusTable;
use crate::workbook::read_workbook_records;

/// Census file formats the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xls,
    Xlsx,
}

impl SourceFormat {
    /// Pick the format from the file extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

/// Parse one uploaded census file.
pub fn read_census(filename: &str, bytes: &[u8]) -> Result<CensusTable, IngestError> {
    let format =
        SourceFormat::from_filename(filename).ok_or_else(|| IngestError::UnsupportedFormat {
            filename: filename.to_string(),
        })?;
    let records = match format {
        SourceFormat::Csv => read_csv_records(filename, bytes)?,
        SourceFormat::Xls | SourceFormat::Xlsx => read_workbook_records(filename, bytes)?,
    };
    let record_count = records.len();
    let Some(table) = CensusTable::from_records(records) else {
        warn!(filename, "census file has no header row");
        return Err(IngestError::Empty {
            filename: filename.to_string(),
        });
    };
    debug!(
        filename,
        ?format,
        record_count,
        header_count = table.headers().len(),
        row_count = table.row_count(),
        "census file parsed"
    );
    Ok(table)
}

/// Spreadsheet tools export CSV with commas, semicolons or tabs; pick whichever
/// dominates the first line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(bytes);
    let count = |needle: u8| first_line.iter().filter(|b| **b == needle).count();
    let candidates = [(b',', count(b',')), (b';', count(b';')), (b'\t', count(b'\t'))];
    candidates
        .iter()
        .copied()
        .max_by_key(|(_, hits)| *hits)
        .filter(|(_, hits)| *hits > 0)
        .map_or(b',', |(delimiter, _)| delimiter)
}

fn read_csv_records(filename: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(bytes))
        .from_reader(bytes);
    let mut records = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| IngestError::Csv {
            filename: filename.to_string(),
            source,
        })?;
        let row: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        records.push(row);
    }
    Ok(records)
}
