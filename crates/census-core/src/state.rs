//! Persisted per-quote census state.

use serde::{Deserialize, Serialize};
use tracing::warn;

use census_model::{
    CellCorrections, CensusStatus, HeaderMapping, StandardizationRun, ValueMappings,
};

use crate::ledger::IssueLedger;

/// Everything the engine remembers about one quote's census.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusState {
    pub status: CensusStatus,
    /// Mapping used by the latest pass; seeds the next one.
    pub header_mapping: HeaderMapping,
    pub value_mappings: ValueMappings,
    pub corrections: CellCorrections,
    pub ledger: IssueLedger,
    pub run: Option<StandardizationRun>,
    /// Passes recorded since the census was last reset.
    pub runs: u64,
}

impl CensusState {
    /// Repair a state saved mid-pass. No pass survives a restart, so the
    /// status falls back to what the latest run says.
    pub fn recovered(mut self) -> Self {
        if self.status == CensusStatus::Validating {
            let status = CensusStatus::from_run(self.run.as_ref());
            warn!(recovered = status.label(), "census state was saved mid-pass");
            self.status = status;
        }
        self
    }

    /// Forget the census entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
