//! Name Registry, Wallet Factory & Custodial Wallets
//!
//! This crate implements the contract layer for named custodial wallets:
//! a global name registry, a factory that provisions one wallet per newly
//! claimed name, and wallets that move multi-token balances held in
//! external token ledgers on behalf of a single owner.
//!
//! # Modules
//! - `errors`: Contract error taxonomy
//! - `events`: Contract events and the sequenced event log
//! - `journal`: Staged state with commit / rollback
//! - `security`: Owner and single-writer access guards
//! - `ledger`: Fungible token ledger interface and reference ledger
//! - `registry`: Name -> account table
//! - `wallet`: Per-owner wallet
//! - `factory`: Name claiming and wallet provisioning
//! - `config`: Runtime configuration
//! - `runtime`: Atomic execution of every operation
//!
//! # Version
//! v0.1.0, initial implementation

pub mod errors;
pub mod events;
pub mod journal;
pub mod security;
pub mod ledger;
pub mod registry;
pub mod wallet;
pub mod factory;
pub mod config;
pub mod runtime;

pub use runtime::Runtime;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
