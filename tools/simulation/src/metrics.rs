//! Performance metrics for simulation
//!
//! Counts actions by kind and outcome, plus a per-action latency histogram
//! and overall throughput.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{SimAction, SimOutcome};

/// Latency histogram bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub label: String,
    pub lower_ns: u64,
    pub upper_ns: u64,
    pub count: u64,
}

/// Aggregated simulation metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimMetrics {
    pub total_actions: u64,
    pub wallets_created: u64,
    pub names_rejected: u64,
    pub fundings: u64,
    pub transfers: u64,
    pub transfers_failed: u64,
    pub unknown_recipients: u64,
    pub owner_rejections: u64,
    pub balance_queries: u64,
    /// Rejections by error kind
    pub rejections: BTreeMap<String, u64>,
    pub latency_buckets: Vec<LatencyBucket>,
    pub elapsed_ns: u64,
}

impl SimMetrics {
    /// Create empty metrics with default latency buckets.
    pub fn new() -> Self {
        Self {
            total_actions: 0,
            wallets_created: 0,
            names_rejected: 0,
            fundings: 0,
            transfers: 0,
            transfers_failed: 0,
            unknown_recipients: 0,
            owner_rejections: 0,
            balance_queries: 0,
            rejections: BTreeMap::new(),
            latency_buckets: default_buckets(),
            elapsed_ns: 0,
        }
    }

    /// Record one applied or rejected action.
    pub fn record(&mut self, action: &SimAction, outcome: &SimOutcome) {
        self.total_actions += 1;

        match (action, outcome) {
            (SimAction::CreateWallet { .. }, SimOutcome::Applied) => self.wallets_created += 1,
            (SimAction::FundWallet { .. }, SimOutcome::Applied) => self.fundings += 1,
            (SimAction::WalletTransfer { .. }, SimOutcome::Applied) => self.transfers += 1,
            (SimAction::BatchBalances { .. }, SimOutcome::Applied) => self.balance_queries += 1,
            _ => {}
        }

        if let Some(kind) = outcome.kind() {
            match kind {
                "name_already_used" => self.names_rejected += 1,
                "transfer_failed" => self.transfers_failed += 1,
                "unknown_recipient" => self.unknown_recipients += 1,
                "not_owner" => self.owner_rejections += 1,
                _ => {}
            }
            *self.rejections.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Record latency in nanoseconds.
    pub fn record_latency(&mut self, latency_ns: u64) {
        for bucket in &mut self.latency_buckets {
            if latency_ns >= bucket.lower_ns && latency_ns < bucket.upper_ns {
                bucket.count += 1;
                return;
            }
        }
        // Overflow bucket (last)
        if let Some(last) = self.latency_buckets.last_mut() {
            last.count += 1;
        }
    }

    pub fn set_elapsed(&mut self, ns: u64) {
        self.elapsed_ns = ns;
    }

    /// Total rejected actions.
    pub fn total_rejected(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Throughput: actions per second.
    pub fn actions_per_second(&self) -> f64 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.total_actions as f64 / (self.elapsed_ns as f64 / 1_000_000_000.0)
    }

    /// Build a summary string.
    pub fn summary(&self) -> String {
        format!(
            "Actions: {} | Wallets: {} | Transfers: {} | Failed: {} | Rejected: {} | Throughput: {:.0} actions/s",
            self.total_actions,
            self.wallets_created,
            self.transfers,
            self.transfers_failed,
            self.total_rejected(),
            self.actions_per_second(),
        )
    }
}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Default latency histogram buckets.
fn default_buckets() -> Vec<LatencyBucket> {
    vec![
        LatencyBucket { label: "<1μs".into(), lower_ns: 0, upper_ns: 1_000, count: 0 },
        LatencyBucket { label: "1-10μs".into(), lower_ns: 1_000, upper_ns: 10_000, count: 0 },
        LatencyBucket { label: "10-100μs".into(), lower_ns: 10_000, upper_ns: 100_000, count: 0 },
        LatencyBucket { label: "100μs-1ms".into(), lower_ns: 100_000, upper_ns: 1_000_000, count: 0 },
        LatencyBucket { label: ">1ms".into(), lower_ns: 1_000_000, upper_ns: u64::MAX, count: 0 },
    ]
}
