//! Metrics and report export
//!
//! Serializes a finished run to JSON for external consumption.

use serde::{Deserialize, Serialize};

use crate::engine::{SimConfig, SimEngine};
use crate::metrics::SimMetrics;
use crate::replay::{capture_snapshot, EngineSnapshot};

/// Combined export containing all simulation outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationExport {
    pub version: String,
    pub config: SimConfig,
    pub metrics: SimMetrics,
    pub snapshot: EngineSnapshot,
    pub action_count: usize,
    pub violations: Vec<String>,
}

/// Build a complete simulation export.
pub fn build_export(engine: &SimEngine) -> SimulationExport {
    SimulationExport {
        version: crate::VERSION.to_string(),
        config: engine.config().clone(),
        metrics: engine.metrics.clone(),
        snapshot: capture_snapshot(engine),
        action_count: engine.actions.len(),
        violations: engine.check_invariants(),
    }
}

/// Export complete simulation data as JSON.
pub fn export_json(export: &SimulationExport) -> String {
    serde_json::to_string_pretty(export).unwrap_or_default()
}

/// Write export to a file path.
pub fn write_to_file(export: &SimulationExport, path: &str) -> std::io::Result<()> {
    let json = export_json(export);
    std::fs::write(path, json)
}
