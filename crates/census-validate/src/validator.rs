//! Row validation driver.

use census_ingest::CensusTable;
use census_model::{CellCorrections, HeaderMapping, ValueMappings};
use census_standards::FieldCatalog;
use census_transform::normalize_value;
use tracing::debug;

use crate::checks::{canonical_value, check_value};
use crate::error::ValidationFault;
use crate::issue::IssueKind;
use crate::report::ValidationReport;

/// Everything a pass reads besides the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub table: &'a CensusTable,
    pub mapping: &'a HeaderMapping,
    pub value_mappings: &'a ValueMappings,
    pub corrections: &'a CellCorrections,
}

/// Validate every row against the catalog rules.
///
/// Unmapped fields produce one aggregate (row 0) "missing required column"
/// issue, and a census without data rows gets one census-wide issue. For
/// mapped fields each cell is read through the header mapping, replaced by an
/// operator correction when one exists, passed through the value mappings,
/// then checked. The pass is pure: identical inputs give an
/// identical report.
pub fn validate(
    catalog: &FieldCatalog,
    input: &ValidationInput<'_>,
) -> Result<ValidationReport, ValidationFault> {
    let table = input.table;
    let mut issues = Vec::new();
    let mut columns = Vec::with_capacity(catalog.fields().len());

    for spec in catalog.fields() {
        let Some(header) = input.mapping.header_for(spec.field) else {
            issues.push(IssueKind::MissingColumn.into_issue(0, spec.field, None, None));
            columns.push(None);
            continue;
        };
        let index = table
            .header_index(header)
            .ok_or_else(|| ValidationFault::HeaderNotInTable {
                field: spec.field.id().to_string(),
                header: header.to_string(),
            })?;
        columns.push(Some(index));
    }

    if table.row_count() == 0 {
        issues.push(IssueKind::NoRows.into_census_issue());
    }

    let width = table.headers().len();
    let mut rows = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        if row.cells.len() != width {
            return Err(ValidationFault::RowWidth {
                row: row.number,
                found: row.cells.len(),
                expected: width,
            });
        }
        let mut standardized = Vec::with_capacity(columns.len());
        for (spec, column) in catalog.fields().iter().zip(&columns) {
            let Some(index) = column else {
                standardized.push(String::new());
                continue;
            };
            let raw = input
                .corrections
                .get(row.number, spec.field)
                .or_else(|| row.cells.get(*index).map(String::as_str))
                .unwrap_or_default();
            let value = normalize_value(raw, spec.field, input.value_mappings);
            match check_value(spec, &value) {
                Some(finding) => {
                    let observed = (!raw.is_empty()).then_some(raw);
                    issues.push(finding.kind.into_issue(
                        row.number,
                        spec.field,
                        observed,
                        finding.suggestion,
                    ));
                    standardized.push(value);
                }
                None => standardized.push(canonical_value(spec, &value)),
            }
        }
        rows.push(standardized);
    }

    debug!(
        rows = rows.len(),
        issues = issues.len(),
        corrections = input.corrections.len(),
        "validation pass finished"
    );
    Ok(ValidationReport { issues, rows })
}
