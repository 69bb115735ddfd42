//! Table rendering for command output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use census_core::{GateBlock, GateDecision, IssueGroup, QueueEntry};
use census_map::HeaderCandidate;
use census_model::{CanonicalField, CensusStatus, RunStatus, StandardizationRun, UploadRecord};
use census_standards::FieldCatalog;

/// Values shown per group before eliding the rest.
const GROUP_EXAMPLES: usize = 3;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_detail_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn run_status_cell(status: RunStatus) -> Cell {
    let color = match status {
        RunStatus::Complete => Color::Green,
        RunStatus::NeedsReview => Color::Yellow,
    };
    Cell::new(status.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn census_status_cell(status: CensusStatus) -> Cell {
    let color = match status {
        CensusStatus::Complete => Color::Green,
        CensusStatus::NeedsReview => Color::Yellow,
        CensusStatus::Validating => Color::Cyan,
        CensusStatus::Unvalidated => Color::DarkGrey,
    };
    Cell::new(status.label()).fg(color)
}

pub fn fields_table(catalog: &FieldCatalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Rule"),
        header_cell("Codes"),
        header_cell("Aliases"),
    ]);
    apply_table_style(&mut table);
    for spec in catalog.fields() {
        let codes = if spec.rule.codes.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(spec.rule.codes.join(", "))
        };
        table.add_row(vec![
            Cell::new(spec.field.id()).add_attribute(Attribute::Bold),
            Cell::new(&spec.label),
            Cell::new(spec.rule.kind.id()),
            codes,
            Cell::new(spec.aliases.join(", ")),
        ]);
    }
    table
}

/// Key/value summary of one standardization run.
pub fn run_table(run: &StandardizationRun) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![header_cell("Run"), Cell::new(run.sequence())]);
    table.add_row(vec![header_cell("Status"), run_status_cell(run.status())]);
    table.add_row(vec![header_cell("Rows"), Cell::new(run.total_rows())]);
    table.add_row(vec![header_cell("Issues"), Cell::new(run.issue_count())]);
    table.add_row(vec![header_cell("Rows with issues"), Cell::new(run.issue_rows())]);
    table.add_row(vec![
        header_cell("Headers"),
        Cell::new(run.detected_headers().join(", ")),
    ]);
    table.add_row(vec![
        header_cell("Artifact"),
        optional_cell(run.standardized_filename()),
    ]);
    table.add_row(vec![header_cell("Catalog"), Cell::new(run.catalog_version())]);
    table.add_row(vec![
        header_cell("Created"),
        Cell::new(run.created_at().format("%Y-%m-%d %H:%M:%S UTC")),
    ]);
    table
}

/// Field to header mapping of a run, with unmapped fields flagged.
pub fn mapping_table(run: &StandardizationRun) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Header")]);
    apply_table_style(&mut table);
    for field in CanonicalField::ALL {
        let header = match run.header_mapping().header_for(field) {
            Some(header) => Cell::new(header),
            None => Cell::new("unmapped").fg(Color::Red),
        };
        table.add_row(vec![Cell::new(field.id()), header]);
    }
    table
}

pub fn queue_table(entries: &[QueueEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Issue"),
        header_cell("Value"),
        header_cell("Correction"),
    ]);
    apply_detail_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in entries {
        let issue = &entry.issue;
        let row = if issue.is_aggregate() {
            dim_cell("all")
        } else {
            Cell::new(issue.row)
        };
        let correction = match issue.mapped_value.as_deref() {
            Some(value) => Cell::new(value).fg(Color::Green),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(entry.index),
            row,
            Cell::new(&issue.field),
            Cell::new(&issue.issue),
            optional_cell(issue.value.as_deref()),
            correction,
        ]);
    }
    table
}

pub fn groups_table(groups: &[IssueGroup]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Issue"),
        header_cell("Count"),
        header_cell("Values"),
    ]);
    apply_detail_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for group in groups {
        table.add_row(vec![
            Cell::new(&group.field),
            Cell::new(&group.issue),
            Cell::new(group.len())
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold),
            example_cell(&group.values),
        ]);
    }
    table
}

fn example_cell(values: &[String]) -> Cell {
    if values.is_empty() {
        return dim_cell("-");
    }
    let mut shown: Vec<&str> = values
        .iter()
        .take(GROUP_EXAMPLES)
        .map(String::as_str)
        .collect();
    let hidden = values.len().saturating_sub(GROUP_EXAMPLES);
    let more = format!("+{hidden} more");
    if hidden > 0 {
        shown.push(&more);
    }
    Cell::new(shown.join(", "))
}

pub fn uploads_table(uploads: &[UploadRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("File"),
        header_cell("Kind"),
        header_cell("Bytes"),
        header_cell("Uploaded"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for upload in uploads {
        let kind = Cell::new(upload.kind.as_str());
        table.add_row(vec![
            Cell::new(&upload.id),
            Cell::new(&upload.filename),
            if upload.is_census() { kind.fg(Color::Cyan) } else { kind },
            Cell::new(upload.size_bytes),
            Cell::new(upload.uploaded_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table
}

pub fn candidates_table(rows: &[(CanonicalField, Vec<HeaderCandidate>)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Unmapped field"),
        header_cell("Closest headers"),
    ]);
    apply_table_style(&mut table);
    for (field, candidates) in rows {
        let closest = if candidates.is_empty() {
            dim_cell("none")
        } else {
            Cell::new(
                candidates
                    .iter()
                    .map(|candidate| format!("{} ({}%)", candidate.header, candidate.percent()))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        };
        table.add_row(vec![Cell::new(field.id()).fg(Color::Red), closest]);
    }
    table
}

pub fn status_line(quote: &str, status: CensusStatus, quote_status: Option<&str>) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![header_cell("Quote"), Cell::new(quote)]);
    table.add_row(vec![header_cell("Census"), census_status_cell(status)]);
    table.add_row(vec![header_cell("Quote status"), optional_cell(quote_status)]);
    table
}

/// One-line, user-facing gate outcome.
pub fn gate_message(decision: &GateDecision) -> String {
    match decision.reason() {
        None => "Submission allowed: census is complete.".to_string(),
        Some(GateBlock::NoCensus) => "Submission blocked: no census has been uploaded.".to_string(),
        Some(GateBlock::UnresolvedIssues { remaining }) => {
            format!("Submission blocked: {remaining} census issue(s) remain after resolving.")
        }
    }
}
