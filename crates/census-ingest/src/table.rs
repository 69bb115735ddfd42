use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use census_model::SampleRow;

/// One data row, with cells aligned to the table headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusRow {
    /// 1-based row number counted from the first row after the header.
    pub number: usize,
    pub cells: Vec<String>,
}

/// A parsed census: distinct headers plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusTable {
    headers: Vec<String>,
    rows: Vec<CensusRow>,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

/// Blank header cells get a positional name; repeated headers get a `_N` suffix.
fn distinct_headers(raw: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, value) in raw.iter().enumerate() {
        let mut header = normalize_header(value);
        if header.is_empty() {
            header = format!("Column {}", idx + 1);
        }
        if !seen.insert(header.clone()) {
            let mut suffix = 2usize;
            loop {
                let candidate = format!("{header}_{suffix}");
                if seen.insert(candidate.clone()) {
                    header = candidate;
                    break;
                }
                suffix += 1;
            }
        }
        headers.push(header);
    }
    headers
}

impl CensusTable {
    /// Build a table from raw records: the first non-blank record is the header row.
    ///
    /// Returns `None` when every record is blank.
    pub fn from_records(records: Vec<Vec<String>>) -> Option<Self> {
        let mut non_blank = records
            .into_iter()
            .filter(|record| record.iter().any(|value| !value.trim().is_empty()));
        let header_record = non_blank.next()?;
        let headers = distinct_headers(&header_record);
        let rows = non_blank
            .enumerate()
            .map(|(idx, record)| {
                let cells = (0..headers.len())
                    .map(|col| record.get(col).map(|v| normalize_cell(v)).unwrap_or_default())
                    .collect();
                CensusRow {
                    number: idx + 1,
                    cells,
                }
            })
            .collect();
        Some(Self { headers, rows })
    }

    /// Concatenate several tables into one logical census.
    ///
    /// Headers are the ordered union by first appearance; row numbers continue
    /// across tables; cells for headers a table lacks are empty.
    pub fn concat(tables: Vec<CensusTable>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for table in &tables {
            for header in &table.headers {
                if !headers.contains(header) {
                    headers.push(header.clone());
                }
            }
        }
        let mut rows = Vec::new();
        for table in tables {
            let positions: Vec<Option<usize>> = headers
                .iter()
                .map(|header| table.header_index(header))
                .collect();
            for row in table.rows {
                let number = rows.len() + 1;
                let cells = positions
                    .iter()
                    .map(|pos| {
                        pos.and_then(|idx| row.cells.get(idx).cloned())
                            .unwrap_or_default()
                    })
                    .collect();
                rows.push(CensusRow { number, cells });
            }
        }
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[CensusRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|candidate| candidate == header)
    }

    /// The uploaded cell at 1-based `row` under `header`.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.header_index(header)?;
        let row = self.rows.get(row.checked_sub(1)?)?;
        row.cells.get(column).map(String::as_str)
    }

    /// First `per_header` distinct non-empty values of each header.
    pub fn sample_values(&self, per_header: usize) -> BTreeMap<String, Vec<String>> {
        let mut samples = BTreeMap::new();
        for (col_idx, header) in self.headers.iter().enumerate() {
            let mut values: Vec<String> = Vec::new();
            for row in &self.rows {
                if values.len() >= per_header {
                    break;
                }
                let value = row.cells.get(col_idx).map(String::as_str).unwrap_or("");
                if !value.is_empty() && !values.iter().any(|seen| seen == value) {
                    values.push(value.to_string());
                }
            }
            samples.insert(header.clone(), values);
        }
        samples
    }

    /// The first `count` rows keyed by header.
    pub fn sample_rows(&self, count: usize) -> Vec<SampleRow> {
        self.rows
            .iter()
            .take(count)
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.cells.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn first_non_blank_record_is_the_header_row() {
        let table = CensusTable::from_records(records(&[
            &["", ""],
            &["\u{feff}First ", "  Last   Name "],
            &["Jane", "Doe"],
            &[" ", ""],
            &["John"],
        ]))
        .unwrap();
        assert_eq!(table.headers(), ["First", "Last Name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0].number, 1);
        assert_eq!(table.rows()[1].cells, vec!["John", ""]);
    }

    #[test]
    fn blank_and_duplicate_headers_are_made_distinct() {
        let table =
            CensusTable::from_records(records(&[&["Name", "", "Name", "Name_2"]])).unwrap();
        assert_eq!(table.headers(), ["Name", "Column 2", "Name_2", "Name_2_2"]);
    }

    #[test]
    fn all_blank_input_has_no_table() {
        assert!(CensusTable::from_records(records(&[&["", " "]])).is_none());
        assert!(CensusTable::from_records(Vec::new()).is_none());
    }

    #[test]
    fn concat_unions_headers_and_renumbers_rows() {
        let a = CensusTable::from_records(records(&[&["First", "Zip"], &["Ann", "63101"]]))
            .unwrap();
        let b = CensusTable::from_records(records(&[
            &["Zip", "Gender"],
            &["10001", "F"],
            &["10002", "M"],
        ]))
        .unwrap();
        let table = CensusTable::concat(vec![a, b]);
        assert_eq!(table.headers(), ["First", "Zip", "Gender"]);
        let numbers: Vec<usize> = table.rows().iter().map(|row| row.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(table.rows()[0].cells, vec!["Ann", "63101", ""]);
        assert_eq!(table.rows()[2].cells, vec!["", "10002", "M"]);
        assert_eq!(table.cell(3, "Gender"), Some("M"));
        assert_eq!(table.cell(1, "Gender"), Some(""));
        assert_eq!(table.cell(0, "Zip"), None);
        assert_eq!(table.cell(4, "Zip"), None);
        assert_eq!(table.cell(1, "Tier"), None);
    }

    #[test]
    fn samples_skip_blanks_and_repeats() {
        let table = CensusTable::from_records(records(&[
            &["Tier"],
            &["EE"],
            &[""],
            &["EE"],
            &["EF"],
            &["ES"],
        ]))
        .unwrap();
        let samples = table.sample_values(2);
        assert_eq!(samples["Tier"], vec!["EE", "EF"]);
        let rows = table.sample_rows(1);
        assert_eq!(rows[0]["Tier"], "EE");
    }
}
