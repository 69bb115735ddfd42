//! Standardized census export.

use csv::WriterBuilder;

use crate::error::IngestError;

/// Serialize standardized rows as CSV bytes, header row first.
pub fn write_standardized_csv(
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, IngestError> {
    let export_error = |message: String| IngestError::Export { message };
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(headers)
        .map_err(|error| export_error(error.to_string()))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|error| export_error(error.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|error| export_error(error.to_string()))
}
