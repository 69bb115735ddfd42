use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use census_core::{
    CensusEngine, Collaborators, DirLock, EngineOptions, IssueEdit, JsonDirStore, QueueEntry,
    QuoteStore,
};
use census_model::{
    CanonicalField, CensusStatus, HeaderMapping, QuoteId, StandardizationRun, UploadId,
    UploadRecord, ValueMappings,
};
use census_standards::FieldCatalog;

use crate::cli::{
    BulkFixArgs, Cli, Command, EditIssueArgs, IssuesArgs, QuoteArgs, RemoveArgs, ResolveArgs,
    StandardizeArgs, UploadArgs,
};
use crate::logging::redact_value;
use crate::render;

/// Engine options read from the state directory when present.
pub const OPTIONS_FILE: &str = "engine.toml";

/// Closest headers listed per unmapped field in `status`.
const CANDIDATE_LIMIT: usize = 3;

/// Exit code for a gate that blocks submission.
pub const EXIT_BLOCKED: i32 = 2;

/// An engine over the JSON-directory stores of one state directory.
///
/// The session holds the directory lock until it is dropped, so commands
/// sharing a state directory run one at a time.
pub struct Session {
    pub engine: CensusEngine,
    pub store: Arc<JsonDirStore>,
    pub json: bool,
    _lock: DirLock,
}

impl Session {
    pub fn open(state_dir: &Path, json: bool) -> Result<Self> {
        let store = Arc::new(JsonDirStore::open(state_dir).with_context(|| {
            format!("Failed to open state directory: {}", state_dir.display())
        })?);
        let lock = store.lock_exclusive().with_context(|| {
            format!("Failed to lock state directory: {}", state_dir.display())
        })?;
        let options = load_options(state_dir)?;
        let engine = CensusEngine::new(Collaborators::shared(Arc::clone(&store)), options)
            .context("Failed to load the field catalog")?;
        Ok(Self {
            engine,
            store,
            json,
            _lock: lock,
        })
    }
}

/// `engine.toml` from the state directory, or the defaults.
pub fn load_options(state_dir: &Path) -> Result<EngineOptions> {
    let path = state_dir.join(OPTIONS_FILE);
    if !path.exists() {
        return Ok(EngineOptions::default());
    }
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read engine options from {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse engine options from {}", path.display()))
}

/// Run one parsed command; returns the process exit code.
pub fn execute(cli: &Cli) -> Result<i32> {
    if matches!(cli.command, Command::Fields) {
        return run_fields(cli.json);
    }
    let session = Session::open(&cli.state_dir, cli.json)?;
    match &cli.command {
        Command::Fields => Ok(0),
        Command::Upload(args) => run_upload(&session, args),
        Command::Remove(args) => run_remove(&session, args),
        Command::Standardize(args) => run_standardize(&session, args),
        Command::Issues(args) => run_issues(&session, args),
        Command::EditIssue(args) => run_edit_issue(&session, args),
        Command::BulkFix(args) => run_bulk_fix(&session, args),
        Command::Resolve(args) => run_resolve(&session, args),
        Command::Gate(args) => run_gate(&session, args),
        Command::Submit(args) => run_submit(&session, args),
        Command::Status(args) => run_status(&session, args),
    }
}

fn quote_id(args: &QuoteArgs) -> Result<QuoteId> {
    QuoteId::new(args.quote.as_str()).with_context(|| format!("Invalid quote id: {}", args.quote))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_run(session: &Session, run: &StandardizationRun) -> Result<()> {
    if session.json {
        return print_json(run);
    }
    println!("{}", render::run_table(run));
    Ok(())
}

#[derive(Serialize)]
struct FieldRow<'a> {
    field: &'static str,
    label: &'a str,
    rule: &'static str,
    codes: &'a [String],
    aliases: &'a [String],
}

pub fn run_fields(json: bool) -> Result<i32> {
    let catalog = FieldCatalog::builtin().context("Failed to load the field catalog")?;
    if json {
        let rows: Vec<FieldRow<'_>> = catalog
            .fields()
            .iter()
            .map(|spec| FieldRow {
                field: spec.field.id(),
                label: &spec.label,
                rule: spec.rule.kind.id(),
                codes: &spec.rule.codes,
                aliases: &spec.aliases,
            })
            .collect();
        print_json(&rows)?;
    } else {
        println!("Catalog version: {}", catalog.version());
        println!("{}", render::fields_table(catalog));
    }
    Ok(0)
}

fn run_upload(session: &Session, args: &UploadArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;
    let bytes = fs::read(&args.file)
        .with_context(|| format!("Failed to read census file: {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    info!(quote = %quote, file = %args.file.display(), bytes = bytes.len(), "uploading census");

    let outcome = session
        .engine
        .upload_census(&quote, &filename, &bytes)
        .with_context(|| format!("Failed to upload {filename}"))?;
    if session.json {
        print_json(&outcome)?;
    } else {
        println!("Uploaded {} as {}", filename, outcome.upload.id);
        println!("{}", render::run_table(&outcome.run));
    }
    Ok(0)
}

fn run_remove(session: &Session, args: &RemoveArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;
    let upload = UploadId::new(args.upload.as_str())
        .with_context(|| format!("Invalid upload id: {}", args.upload))?;
    match session.engine.remove_upload(&quote, &upload)? {
        Some(run) => print_run(session, &run)?,
        None if session.json => print_json(&CensusStatus::Unvalidated)?,
        None => println!("Census reset: no census uploads remain for {quote}."),
    }
    Ok(0)
}

fn run_standardize(session: &Session, args: &StandardizeArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;

    let mut header_map = HeaderMapping::new();
    for (field, header) in &args.header_map {
        header_map
            .assign(*field, header)
            .with_context(|| format!("Cannot map {field} to '{header}'"))?;
    }
    let mut value_mappings = ValueMappings::new();
    for (field, source, target) in &args.value_mappings {
        debug!(
            field = field.id(),
            source = redact_value(source),
            target = redact_value(target),
            "value mapping requested"
        );
        value_mappings.insert(*field, source, target);
    }

    let run = session.engine.standardize(
        &quote,
        (!header_map.is_empty()).then_some(&header_map),
        (!value_mappings.is_empty()).then_some(&value_mappings),
    )?;
    print_run(session, &run)?;
    if !session.json {
        println!("{}", render::mapping_table(&run));
    }
    Ok(0)
}

fn run_issues(session: &Session, args: &IssuesArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;
    if args.grouped {
        let groups = session.engine.grouped_issues(&quote)?;
        if session.json {
            print_json(&groups)?;
        } else if groups.is_empty() {
            println!("No outstanding issues.");
        } else {
            println!("{}", render::groups_table(&groups));
        }
        return Ok(0);
    }

    let mut queue = session.engine.fix_queue(&quote)?;
    if args.pending {
        queue.retain(|entry| entry.pending);
    }
    if session.json {
        print_json(&queue)?;
    } else if queue.is_empty() {
        println!("No outstanding issues.");
    } else {
        println!("{}", render::queue_table(&queue));
    }
    Ok(0)
}

fn run_edit_issue(session: &Session, args: &EditIssueArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;
    let edit = IssueEdit {
        row: args.row,
        field: args.field,
        value: args.value.clone(),
        mapped_value: args.mapped_value.clone(),
    };
    debug!(
        index = args.index,
        value = args.value.as_deref().map(redact_value),
        mapped_value = args.mapped_value.as_deref().map(redact_value),
        "editing issue"
    );
    let issue = session.engine.edit_issue(&quote, args.index, &edit)?;
    if session.json {
        print_json(&issue)?;
    } else {
        let entry = QueueEntry {
            index: args.index,
            pending: issue.is_pending(),
            issue,
        };
        println!("{}", render::queue_table(std::slice::from_ref(&entry)));
    }
    Ok(0)
}

fn run_bulk_fix(session: &Session, args: &BulkFixArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;
    info!(
        quote = %quote,
        field = args.field.id(),
        source = redact_value(&args.source),
        target = redact_value(&args.target),
        "bulk fix requested"
    );
    let outcome =
        session
            .engine
            .apply_bulk_fix(&quote, args.field, &args.source, &args.target, args.rerun)?;
    if session.json {
        return print_json(&outcome).map(|()| 0);
    }
    println!(
        "Correction set on {} outstanding {} issue(s).",
        outcome.touched,
        args.field.id()
    );
    if let Some(run) = &outcome.run {
        println!("{}", render::run_table(run));
    }
    Ok(0)
}

fn run_resolve(session: &Session, args: &ResolveArgs) -> Result<i32> {
    let quote = quote_id(&args.quote)?;
    for (index, value) in &args.corrections {
        session
            .engine
            .edit_issue(
                &quote,
                *index,
                &IssueEdit {
                    mapped_value: Some(value.clone()),
                    ..IssueEdit::default()
                },
            )
            .with_context(|| format!("Cannot set correction on issue #{index}"))?;
    }
    let ledger = session.engine.issues(&quote)?;
    let run = session.engine.resolve_issues(&quote, ledger.issues())?;
    print_run(session, &run)?;
    Ok(0)
}

fn run_gate(session: &Session, args: &QuoteArgs) -> Result<i32> {
    let quote = quote_id(args)?;
    let decision = session.engine.can_submit(&quote)?;
    if session.json {
        print_json(&decision)?;
    } else {
        println!("{}", render::gate_message(&decision));
    }
    Ok(if decision.is_allowed() { 0 } else { EXIT_BLOCKED })
}

fn run_submit(session: &Session, args: &QuoteArgs) -> Result<i32> {
    let quote = quote_id(args)?;
    let census = session.engine.submit_quote(&quote)?;
    if session.json {
        print_json(&census)?;
    } else {
        println!(
            "Quote {quote} submitted; {} standardized row(s) sent to network assignment.",
            census.rows.len()
        );
    }
    Ok(0)
}

#[derive(Serialize)]
struct StatusView<'a> {
    quote: &'a QuoteId,
    status: CensusStatus,
    quote_status: Option<String>,
    run: Option<&'a StandardizationRun>,
    uploads: &'a [UploadRecord],
}

fn run_status(session: &Session, args: &QuoteArgs) -> Result<i32> {
    let quote = quote_id(args)?;
    let state = session.engine.state(&quote)?;
    let uploads = session.engine.uploads(&quote)?;
    let quote_status = session
        .store
        .status(&quote)
        .context("Failed to read quote status")?;

    if session.json {
        print_json(&StatusView {
            quote: &quote,
            status: state.status,
            quote_status,
            run: state.run.as_ref(),
            uploads: &uploads,
        })?;
        return Ok(0);
    }

    println!(
        "{}",
        render::status_line(quote.as_str(), state.status, quote_status.as_deref())
    );
    if !uploads.is_empty() {
        println!("{}", render::uploads_table(&uploads));
    }
    let Some(run) = &state.run else {
        return Ok(0);
    };
    println!("{}", render::run_table(run));
    println!("{}", render::mapping_table(run));

    let unmapped: Vec<CanonicalField> = run.header_mapping().unmapped_fields();
    if !unmapped.is_empty() {
        let mut rows = Vec::with_capacity(unmapped.len());
        for field in unmapped {
            let candidates = session
                .engine
                .header_candidates(&quote, field, CANDIDATE_LIMIT)?;
            rows.push((field, candidates));
        }
        println!("{}", render::candidates_table(&rows));
    }
    Ok(0)
}
