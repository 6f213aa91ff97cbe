//! Action log and deterministic replay validation
//!
//! Same config and same action log → same final state.

use std::collections::BTreeMap;

use contracts::errors::RuntimeError;
use serde::{Deserialize, Serialize};
use types::numeric::Amount;

use crate::engine::{SimAction, SimConfig, SimEngine};

/// A snapshot of engine state for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub name_count: usize,
    pub wallet_count: usize,
    pub event_count: usize,
    /// Wallet name -> balance per token, in issue order
    pub balances: BTreeMap<String, Vec<Amount>>,
    /// Wallet name -> wallet address
    pub addresses: BTreeMap<String, String>,
}

/// Capture a snapshot of the engine state.
pub fn capture_snapshot(engine: &SimEngine) -> EngineSnapshot {
    let runtime = engine.runtime();
    EngineSnapshot {
        name_count: runtime.name_count(),
        wallet_count: runtime.wallet_count(),
        event_count: runtime.events().len(),
        balances: engine.wallet_balances(),
        addresses: runtime
            .wallets()
            .map(|wallet| (wallet.name().to_string(), wallet.address().to_string()))
            .collect(),
    }
}

/// Apply `actions` to a fresh engine and return the resulting snapshot.
pub fn replay_and_snapshot(
    config: &SimConfig,
    actions: &[SimAction],
) -> Result<EngineSnapshot, RuntimeError> {
    let mut engine = SimEngine::new(config.clone())?;
    for action in actions {
        engine.apply(action);
    }
    Ok(capture_snapshot(&engine))
}

/// Validate replay determinism: run the log through a fresh engine and
/// compare snapshots.
pub fn validate_replay(
    config: &SimConfig,
    actions: &[SimAction],
    expected: &EngineSnapshot,
) -> Result<ReplayValidation, RuntimeError> {
    let replayed = replay_and_snapshot(config, actions)?;

    Ok(ReplayValidation {
        matches: replayed == *expected,
        original: expected.clone(),
        replayed,
    })
}

/// Result of replay validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayValidation {
    pub matches: bool,
    pub original: EngineSnapshot,
    pub replayed: EngineSnapshot,
}

/// Export action log as JSON.
pub fn export_action_log(actions: &[SimAction]) -> String {
    serde_json::to_string_pretty(actions).unwrap_or_default()
}

/// Import action log from JSON.
pub fn import_action_log(json: &str) -> Result<Vec<SimAction>, serde_json::Error> {
    serde_json::from_str(json)
}
