//! Simulation & Invariant Testing Framework
//!
//! Seeded workload simulation for the named wallet contracts. Drives the
//! runtime with reproducible random user activity, checks global
//! invariants, and replays action logs to prove determinism.
//!
//! # Modules
//! - `engine` — Seeded action generator over one runtime
//! - `metrics` — Outcome counters and latency histograms
//! - `replay` — Action log and deterministic replay validation
//! - `export` — Metrics and snapshot JSON export

pub mod engine;
pub mod metrics;
pub mod replay;
pub mod export;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
