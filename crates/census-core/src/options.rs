use serde::{Deserialize, Serialize};

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Rows copied into each run's `sample_rows`.
    pub sample_rows: usize,
    /// Distinct example values kept per header in `sample_data`.
    pub sample_values: usize,
    /// Store a standardized CSV through the file store after each pass.
    pub write_artifact: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sample_rows: 5,
            sample_values: 3,
            write_artifact: true,
        }
    }
}
