//! Census engine service.
//!
//! Every operation that writes census state takes the quote's lock first, so
//! passes for one quote never interleave. Each operation loads the persisted
//! state, works on that copy and saves it once; a failure before the save
//! leaves the stored state untouched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use census_ingest::{CensusTable, read_census};
use census_map::{HeaderAliaser, HeaderCandidate, apply_operator_mapping};
use census_model::{
    CanonicalField, CensusStatus, HeaderMapping, Issue, QuoteId, RunInputs, StandardizationRun,
    UploadId, UploadKind, UploadRecord, ValueMappings,
};
use census_standards::FieldCatalog;
use census_transform::BulkFix;
use census_validate::{IssueKind, ValidationFault, ValidationInput, ValidationReport, validate};

use crate::artifact::{StandardizedCensus, artifact_name};
use crate::error::{CensusError, Result, StoreError};
use crate::gate::{self, GateBlock, GateDecision};
use crate::ledger::{IssueEdit, IssueGroup, IssueLedger, QueueEntry};
use crate::options::EngineOptions;
use crate::state::CensusState;
use crate::store::{
    CensusRepository, FileStore, NetworkAssigner, QUOTE_SUBMITTED, QuoteStore,
};
use crate::workflow::{WorkflowEvent, transition};

/// The collaborators an engine delegates storage and downstream calls to.
#[derive(Clone)]
pub struct Collaborators {
    pub files: Arc<dyn FileStore>,
    pub quotes: Arc<dyn QuoteStore>,
    pub network: Arc<dyn NetworkAssigner>,
    pub repository: Arc<dyn CensusRepository>,
}

impl Collaborators {
    /// Use one store for every collaborator.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: FileStore + QuoteStore + NetworkAssigner + CensusRepository + 'static,
    {
        Self {
            files: store.clone(),
            quotes: store.clone(),
            network: store.clone(),
            repository: store,
        }
    }
}

/// Result of accepting a census upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub upload: UploadRecord,
    pub run: StandardizationRun,
}

/// Result of a bulk value fix.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFixOutcome {
    /// Outstanding issues whose `mapped_value` was set.
    pub touched: usize,
    /// The fresh run, when a re-run was requested.
    pub run: Option<StandardizationRun>,
}

/// Rule evaluation for one pass.
type Validator = fn(
    &FieldCatalog,
    &ValidationInput<'_>,
) -> std::result::Result<ValidationReport, ValidationFault>;

/// Standardization engine over a set of collaborators.
pub struct CensusEngine {
    collaborators: Collaborators,
    catalog: &'static FieldCatalog,
    aliaser: HeaderAliaser,
    validator: Validator,
    options: EngineOptions,
    locks: Mutex<HashMap<QuoteId, Arc<Mutex<()>>>>,
}

impl CensusEngine {
    /// Engine over the built-in field catalog.
    pub fn new(collaborators: Collaborators, options: EngineOptions) -> Result<Self> {
        Ok(Self::with_catalog(
            collaborators,
            FieldCatalog::builtin()?,
            options,
        ))
    }

    pub fn with_catalog(
        collaborators: Collaborators,
        catalog: &'static FieldCatalog,
        options: EngineOptions,
    ) -> Self {
        Self {
            collaborators,
            catalog,
            aliaser: HeaderAliaser::new(catalog),
            validator: validate,
            options,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &'static FieldCatalog {
        self.catalog
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Parse, store and standardize a census file.
    ///
    /// A file that does not parse is rejected before anything is stored.
    pub fn upload_census(
        &self,
        quote: &QuoteId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Err(err) = read_census(filename, bytes) {
            warn!(quote = %quote, filename, error = %err, "census upload rejected");
            return Err(err.into());
        }
        let upload = self
            .collaborators
            .files
            .store(quote, filename, UploadKind::Census, bytes)?;
        info!(quote = %quote, upload = %upload.id, filename, "census uploaded");

        let mut state = self.load_state(quote)?;
        let run = self.run_pass(quote, &mut state, None, None)?;
        Ok(UploadOutcome { upload, run })
    }

    /// Every upload held for the quote, in upload order.
    pub fn uploads(&self, quote: &QuoteId) -> Result<Vec<UploadRecord>> {
        Ok(self.collaborators.files.list(quote)?)
    }

    /// Delete an upload. Removing a census file re-standardizes what is left,
    /// or resets the census when no census upload remains.
    pub fn remove_upload(
        &self,
        quote: &QuoteId,
        upload: &UploadId,
    ) -> Result<Option<StandardizationRun>> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let record = self
            .collaborators
            .files
            .list(quote)?
            .into_iter()
            .find(|record| &record.id == upload)
            .ok_or_else(|| CensusError::UploadNotFound {
                quote: quote.to_string(),
                upload: upload.to_string(),
            })?;
        self.collaborators.files.delete(&record.id)?;
        info!(quote = %quote, upload = %record.id, kind = record.kind.as_str(), "upload removed");

        let mut state = self.load_state(quote)?;
        if !record.is_census() {
            return Ok(state.run);
        }

        if self.census_uploads(quote)?.is_empty() {
            transition(state.status, WorkflowEvent::Reset)?;
            self.delete_artifacts(quote)?;
            self.collaborators.repository.remove(quote)?;
            info!(quote = %quote, "census reset");
            return Ok(None);
        }

        // Row numbers of later files shift, so saved corrections no longer
        // line up with their cells.
        if !state.corrections.is_empty() {
            info!(
                quote = %quote,
                dropped = state.corrections.len(),
                "cell corrections cleared after census removal"
            );
            state.corrections.clear();
        }
        self.run_pass(quote, &mut state, None, None).map(Some)
    }

    // =========================================================================
    // Standardization
    // =========================================================================

    /// Run a full pass, optionally layering operator header choices and value
    /// mappings over what the quote already has.
    pub fn standardize(
        &self,
        quote: &QuoteId,
        header_map: Option<&HeaderMapping>,
        value_mappings: Option<&ValueMappings>,
    ) -> Result<StandardizationRun> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.require_census(quote)?;
        let mut state = self.load_state(quote)?;
        self.run_pass(quote, &mut state, header_map, value_mappings)
    }

    /// Persist the corrections carried by `edited` and run a fresh pass.
    pub fn resolve_issues(&self, quote: &QuoteId, edited: &[Issue]) -> Result<StandardizationRun> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.require_census(quote)?;
        let mut state = self.load_state(quote)?;
        self.resolve_locked(quote, &mut state, edited)
    }

    fn resolve_locked(
        &self,
        quote: &QuoteId,
        state: &mut CensusState,
        edited: &[Issue],
    ) -> Result<StandardizationRun> {
        let table = self.load_table(quote)?;
        let mut recorded = 0;
        for issue in edited.iter().filter(|issue| !issue.is_aggregate()) {
            let (Some(field), Some(value)) = (issue.canonical_field(), issue.correction()) else {
                continue;
            };
            // A value equal to the uploaded cell is no correction; the cell
            // stays tied to whatever header the field maps to.
            let uploaded = state
                .header_mapping
                .header_for(field)
                .and_then(|header| table.cell(issue.row, header));
            if uploaded == Some(value) {
                state.corrections.remove(issue.row, field);
                continue;
            }
            if state.corrections.set(issue.row, field, value) {
                recorded += 1;
            }
        }
        debug!(quote = %quote, recorded, "cell corrections recorded");
        self.run_pass(quote, state, None, None)
    }

    /// One pass: detect, map, normalize, validate, record.
    ///
    /// The header mapping is settled before the status moves, so a bad
    /// operator mapping is rejected without touching the workflow. A
    /// validation fault still records a run, with the fault as its only
    /// issue, before the fault is returned.
    fn run_pass(
        &self,
        quote: &QuoteId,
        state: &mut CensusState,
        header_map: Option<&HeaderMapping>,
        value_mappings: Option<&ValueMappings>,
    ) -> Result<StandardizationRun> {
        let started = Instant::now();
        let table = self.load_table(quote)?;
        let headers = table.headers();

        let mut seed = state.header_mapping.clone();
        for (field, header) in seed.retain_headers(headers) {
            warn!(
                quote = %quote,
                field = field.id(),
                header,
                "dropped mapping to a header missing from the census"
            );
        }
        if let Some(overrides) = header_map {
            seed = apply_operator_mapping(&seed, overrides, headers)?;
        }
        let (mapping, matches) = self.aliaser.detect(headers, &seed);
        debug!(quote = %quote, detected = matches.len(), "header aliasing done");
        for field in CanonicalField::ALL {
            if state.header_mapping.header_for(field) == mapping.header_for(field) {
                continue;
            }
            let dropped = state.corrections.clear_field(field);
            if dropped > 0 {
                info!(
                    quote = %quote,
                    field = field.id(),
                    dropped,
                    "cell corrections dropped after header remap"
                );
            }
        }

        if let Some(extra) = value_mappings {
            state.value_mappings.merge(extra);
        }
        let pruned = state.corrections.retain_rows(table.row_count());
        if pruned > 0 {
            debug!(quote = %quote, pruned, "corrections for missing rows dropped");
        }
        state.header_mapping = mapping;
        state.status = transition(state.status, WorkflowEvent::Validate)?;

        let input = ValidationInput {
            table: &table,
            mapping: &state.header_mapping,
            value_mappings: &state.value_mappings,
            corrections: &state.corrections,
        };
        let (issues, standardized_filename, fault) = match (self.validator)(self.catalog, &input) {
            Ok(report) => {
                let filename = if self.options.write_artifact {
                    Some(self.write_artifact(quote, &report)?)
                } else {
                    None
                };
                (report.issues, filename, None)
            }
            Err(fault) => {
                warn!(quote = %quote, error = %fault, "validation fault; census needs review");
                (vec![fault_issue(&fault)], None, Some(fault))
            }
        };

        state.runs += 1;
        let inputs = RunInputs {
            sequence: state.runs,
            total_rows: table.row_count(),
            detected_headers: headers.to_vec(),
            header_mapping: state.header_mapping.clone(),
            sample_data: table.sample_values(self.options.sample_values),
            sample_rows: table.sample_rows(self.options.sample_rows),
            standardized_filename,
            catalog_version: self.catalog.version().to_string(),
        };
        let run = StandardizationRun::new(inputs, &issues, Utc::now());
        state.status = transition(
            state.status,
            WorkflowEvent::Finished {
                clean: run.is_complete(),
            },
        )?;
        state.ledger.replace(issues);
        state.run = Some(run.clone());

        info!(
            quote = %quote,
            run = run.sequence(),
            rows = run.total_rows(),
            issues = run.issue_count(),
            status = run.status().label(),
            duration_ms = started.elapsed().as_millis(),
            "standardization pass finished"
        );
        self.collaborators.repository.save(quote, state)?;

        match fault {
            Some(fault) => Err(fault.into()),
            None => Ok(run),
        }
    }

    // =========================================================================
    // Issue ledger
    // =========================================================================

    /// Add `source -> target` to the field's value mappings and set the
    /// target on every matching outstanding issue, optionally re-running.
    ///
    /// Mapping and ledger are saved together or not at all.
    pub fn apply_bulk_fix(
        &self,
        quote: &QuoteId,
        field: CanonicalField,
        source: &str,
        target: &str,
        rerun: bool,
    ) -> Result<BulkFixOutcome> {
        let fix = BulkFix::new(field, source, target)?;
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if rerun {
            self.require_census(quote)?;
        }
        let mut state = self.load_state(quote)?;
        fix.record(&mut state.value_mappings);
        let touched = state.ledger.apply_bulk_fix(&fix);
        info!(quote = %quote, field = field.id(), touched, rerun, "bulk fix applied");

        let run = if rerun {
            Some(self.run_pass(quote, &mut state, None, None)?)
        } else {
            self.collaborators.repository.save(quote, &state)?;
            None
        };
        Ok(BulkFixOutcome { touched, run })
    }

    /// Edit one issue in place. Nothing is re-validated.
    pub fn edit_issue(&self, quote: &QuoteId, index: usize, edit: &IssueEdit) -> Result<Issue> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self.load_state(quote)?;
        let issue = state.ledger.edit(index, edit)?.clone();
        self.collaborators.repository.save(quote, &state)?;
        Ok(issue)
    }

    pub fn issues(&self, quote: &QuoteId) -> Result<IssueLedger> {
        Ok(self.load_state(quote)?.ledger)
    }

    pub fn fix_queue(&self, quote: &QuoteId) -> Result<Vec<QueueEntry>> {
        Ok(self.load_state(quote)?.ledger.fix_queue())
    }

    pub fn grouped_issues(&self, quote: &QuoteId) -> Result<Vec<IssueGroup>> {
        Ok(self.load_state(quote)?.ledger.grouped())
    }

    // =========================================================================
    // Gate and submission
    // =========================================================================

    /// Decide whether the quote may be submitted right now.
    ///
    /// Outstanding issues trigger one resolve pass with the ledger as it
    /// stands; the decision is taken on what that pass leaves behind.
    pub fn can_submit(&self, quote: &QuoteId) -> Result<GateDecision> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self.load_state(quote)?;
        self.gate_locked(quote, &mut state)
    }

    fn gate_locked(&self, quote: &QuoteId, state: &mut CensusState) -> Result<GateDecision> {
        let has_census = !self.census_uploads(quote)?.is_empty();
        let decision = gate::evaluate(has_census, &state.ledger);
        let unresolved = matches!(
            decision,
            GateDecision::Blocked(GateBlock::UnresolvedIssues { .. })
        );
        // A census stored without ever being standardized has an empty
        // ledger that proves nothing.
        let never_run = has_census && state.run.is_none();
        if !unresolved && !never_run {
            return Ok(decision);
        }

        let edited = state.ledger.issues().to_vec();
        match self.resolve_locked(quote, state, &edited) {
            Ok(_) => {}
            // The fault run is already recorded in `state`; it blocks below.
            Err(CensusError::Validation(fault)) => {
                warn!(quote = %quote, error = %fault, "resolve pass faulted during gate check");
            }
            Err(err) => return Err(err),
        }
        Ok(gate::evaluate(true, &state.ledger))
    }

    /// Re-check the gate, mark the quote submitted and hand the standardized
    /// census to network assignment.
    pub fn submit_quote(&self, quote: &QuoteId) -> Result<StandardizedCensus> {
        let lock = self.quote_lock(quote);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self.load_state(quote)?;
        if let GateDecision::Blocked(block) = self.gate_locked(quote, &mut state)? {
            info!(quote = %quote, ?block, "submission blocked");
            return Err(block.into_error(quote.as_str()));
        }

        let report = self.revalidate(quote, &state)?;
        if !report.is_clean() {
            return Err(CensusError::UnresolvedIssues {
                remaining: report.len(),
            });
        }
        let census = StandardizedCensus::from_report(&report);

        self.collaborators
            .quotes
            .update_status(quote, QUOTE_SUBMITTED)?;
        self.collaborators.network.assign(quote, &census)?;
        info!(quote = %quote, rows = census.rows.len(), "quote submitted");
        Ok(census)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The persisted state, with a mid-pass status repaired.
    pub fn state(&self, quote: &QuoteId) -> Result<CensusState> {
        self.load_state(quote)
    }

    pub fn current_run(&self, quote: &QuoteId) -> Result<Option<StandardizationRun>> {
        Ok(self.load_state(quote)?.run)
    }

    pub fn status(&self, quote: &QuoteId) -> Result<CensusStatus> {
        Ok(self.load_state(quote)?.status)
    }

    /// Unused headers ranked as candidates for `field`, best first.
    pub fn header_candidates(
        &self,
        quote: &QuoteId,
        field: CanonicalField,
        limit: usize,
    ) -> Result<Vec<HeaderCandidate>> {
        let table = self.load_table(quote)?;
        let state = self.load_state(quote)?;
        Ok(self
            .aliaser
            .candidates(field, table.headers(), &state.header_mapping, limit))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn quote_lock(&self, quote: &QuoteId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(quote.clone()).or_default())
    }

    fn load_state(&self, quote: &QuoteId) -> Result<CensusState> {
        Ok(self
            .collaborators
            .repository
            .load(quote)?
            .map(CensusState::recovered)
            .unwrap_or_default())
    }

    fn census_uploads(&self, quote: &QuoteId) -> Result<Vec<UploadRecord>> {
        Ok(self
            .collaborators
            .files
            .list(quote)?
            .into_iter()
            .filter(UploadRecord::is_census)
            .collect())
    }

    fn require_census(&self, quote: &QuoteId) -> Result<()> {
        if self.census_uploads(quote)?.is_empty() {
            return Err(CensusError::NoCensus {
                quote: quote.to_string(),
            });
        }
        Ok(())
    }

    /// All census uploads as one table. A stored file that no longer parses
    /// contributes nothing.
    fn load_table(&self, quote: &QuoteId) -> Result<CensusTable> {
        let mut tables = Vec::new();
        for record in self.census_uploads(quote)? {
            let bytes = self.collaborators.files.read(&record.id)?;
            match read_census(&record.filename, &bytes) {
                Ok(table) => tables.push(table),
                Err(err) => {
                    warn!(
                        quote = %quote,
                        upload = %record.id,
                        error = %err,
                        "stored census no longer parses; skipped"
                    );
                }
            }
        }
        Ok(CensusTable::concat(tables))
    }

    fn revalidate(&self, quote: &QuoteId, state: &CensusState) -> Result<ValidationReport> {
        let table = self.load_table(quote)?;
        let input = ValidationInput {
            table: &table,
            mapping: &state.header_mapping,
            value_mappings: &state.value_mappings,
            corrections: &state.corrections,
        };
        Ok((self.validator)(self.catalog, &input)?)
    }

    /// Store the standardized CSV, replacing earlier ones.
    fn write_artifact(&self, quote: &QuoteId, report: &ValidationReport) -> Result<String> {
        let bytes = StandardizedCensus::from_report(report)
            .to_csv()
            .map_err(|err| StoreError::Encode {
                what: "standardized census".to_string(),
                message: err.to_string(),
            })?;
        let name = artifact_name(quote, &bytes);
        let previous = self.artifacts(quote)?;
        self.collaborators
            .files
            .store(quote, &name, UploadKind::Standardized, &bytes)?;
        for record in previous {
            self.collaborators.files.delete(&record.id)?;
        }
        Ok(name)
    }

    fn artifacts(&self, quote: &QuoteId) -> Result<Vec<UploadRecord>> {
        Ok(self
            .collaborators
            .files
            .list(quote)?
            .into_iter()
            .filter(|record| record.kind == UploadKind::Standardized)
            .collect())
    }

    fn delete_artifacts(&self, quote: &QuoteId) -> Result<()> {
        for record in self.artifacts(quote)? {
            self.collaborators.files.delete(&record.id)?;
        }
        Ok(())
    }
}

/// Row-0 issue standing in for a pass that could not complete.
///
/// Filed under the field the fault names, else under the census as a whole.
fn fault_issue(fault: &ValidationFault) -> Issue {
    let kind = IssueKind::Fault {
        detail: fault.to_string(),
    };
    let field = match fault {
        ValidationFault::HeaderNotInTable { field, .. } => CanonicalField::parse(field),
        ValidationFault::RowWidth { .. } => None,
    };
    match field {
        Some(field) => kind.into_issue(0, field, None, None),
        None => kind.into_census_issue(),
    }
}
