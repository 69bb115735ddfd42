//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use census_model::CanonicalField;

#[derive(Parser)]
#[command(
    name = "census",
    version,
    about = "Census standardization - map, validate and correct insurance census files",
    long_about = "Standardize uploaded census spreadsheets against the canonical field catalog.\n\n\
                  Detects headers, normalizes values, records issues for operator correction \
                  and gates quote submission on a clean census."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow census cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Directory holding uploads, census state and quote records.
    #[arg(
        long = "state-dir",
        value_name = "DIR",
        default_value = ".census",
        global = true
    )]
    pub state_dir: PathBuf,

    /// Print results as JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the canonical field catalog.
    Fields,

    /// Upload a census file (.csv, .xls, .xlsx) and standardize it.
    Upload(UploadArgs),

    /// Remove an upload; the census is re-standardized or reset.
    Remove(RemoveArgs),

    /// Re-run standardization, optionally with header or value mappings.
    Standardize(StandardizeArgs),

    /// Show outstanding issues.
    Issues(IssuesArgs),

    /// Edit one issue in place without re-validating.
    EditIssue(EditIssueArgs),

    /// Map one raw value to a corrected value for every matching issue.
    BulkFix(BulkFixArgs),

    /// Apply corrections from the issue list and re-validate.
    Resolve(ResolveArgs),

    /// Check whether the quote may be submitted.
    Gate(QuoteArgs),

    /// Submit the quote and hand the census to network assignment.
    Submit(QuoteArgs),

    /// Show census status, latest run and uploads.
    Status(QuoteArgs),
}

#[derive(Args)]
pub struct QuoteArgs {
    /// Quote the census belongs to.
    #[arg(long = "quote", short = 'Q', value_name = "QUOTE_ID")]
    pub quote: String,
}

#[derive(Args)]
pub struct UploadArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    /// Census file to upload.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    /// Upload id as shown by `status`.
    #[arg(value_name = "UPLOAD_ID")]
    pub upload: String,
}

#[derive(Args)]
pub struct StandardizeArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    /// Map a field to a header, e.g. `--map dob="Date of Birth"`.
    #[arg(long = "map", value_name = "FIELD=HEADER", value_parser = parse_header_choice)]
    pub header_map: Vec<(CanonicalField, String)>,

    /// Rewrite a raw value, e.g. `--value gender:female=F`.
    #[arg(long = "value", value_name = "FIELD:RAW=VALUE", value_parser = parse_value_mapping)]
    pub value_mappings: Vec<(CanonicalField, String, String)>,
}

#[derive(Args)]
pub struct IssuesArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    /// Group issues by field and description, largest group first.
    #[arg(long = "grouped")]
    pub grouped: bool,

    /// Only show issues still waiting for a correction.
    #[arg(long = "pending", conflicts_with = "grouped")]
    pub pending: bool,
}

#[derive(Args)]
pub struct EditIssueArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    /// Issue index as shown by `issues`.
    #[arg(value_name = "INDEX")]
    pub index: usize,

    #[arg(long = "row")]
    pub row: Option<usize>,

    #[arg(long = "field", value_parser = parse_field)]
    pub field: Option<CanonicalField>,

    #[arg(long = "value")]
    pub value: Option<String>,

    /// Corrected value to write back on resolve.
    #[arg(long = "mapped-value")]
    pub mapped_value: Option<String>,
}

#[derive(Args)]
pub struct BulkFixArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    #[arg(long = "field", value_parser = parse_field)]
    pub field: CanonicalField,

    /// Raw value to replace (matched case- and whitespace-insensitively).
    #[arg(long = "from", value_name = "RAW")]
    pub source: String,

    /// Replacement value.
    #[arg(long = "to", value_name = "VALUE")]
    pub target: String,

    /// Re-validate immediately after recording the fix.
    #[arg(long = "rerun")]
    pub rerun: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub quote: QuoteArgs,

    /// Set an issue's corrected value before resolving, e.g. `--set 0=63101`.
    #[arg(long = "set", value_name = "INDEX=VALUE", value_parser = parse_issue_value)]
    pub corrections: Vec<(usize, String)>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_field(raw: &str) -> Result<CanonicalField, String> {
    raw.parse::<CanonicalField>().map_err(|err| err.to_string())
}

fn parse_header_choice(raw: &str) -> Result<(CanonicalField, String), String> {
    let (field, header) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=HEADER, got '{raw}'"))?;
    let header = header.trim();
    if header.is_empty() {
        return Err(format!("missing header in '{raw}'"));
    }
    Ok((parse_field(field.trim())?, header.to_string()))
}

fn parse_value_mapping(raw: &str) -> Result<(CanonicalField, String, String), String> {
    let (field, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected FIELD:RAW=VALUE, got '{raw}'"))?;
    let (source, target) = rest
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD:RAW=VALUE, got '{raw}'"))?;
    Ok((
        parse_field(field.trim())?,
        source.to_string(),
        target.to_string(),
    ))
}

fn parse_issue_value(raw: &str) -> Result<(usize, String), String> {
    let (index, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{raw}'"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid issue index '{index}': {err}"))?;
    Ok((index, value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_header_and_value_mappings() {
        let cli = Cli::try_parse_from([
            "census",
            "standardize",
            "--quote",
            "Q-1",
            "--map",
            "dob=Date of Birth",
            "--value",
            "gender:female=F",
        ])
        .unwrap();
        let Command::Standardize(args) = cli.command else {
            panic!("expected standardize");
        };
        assert_eq!(
            args.header_map,
            vec![(CanonicalField::Dob, "Date of Birth".to_string())]
        );
        assert_eq!(
            args.value_mappings,
            vec![(
                CanonicalField::Gender,
                "female".to_string(),
                "F".to_string()
            )]
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(parse_header_choice("height=Height").is_err());
        assert!(parse_value_mapping("gender-female=F").is_err());
        assert!(parse_issue_value("x=1").is_err());
        assert_eq!(parse_issue_value("3=63101").unwrap(), (3, "63101".to_string()));
    }
}
