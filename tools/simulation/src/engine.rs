//! Seeded workload engine
//!
//! Drives a [`Runtime`] with a randomized but reproducible stream of user
//! actions: claiming names, funding wallets, moving tokens by name, probing
//! wallets as a stranger and reading balances in batches. Every action is
//! recorded so the run can be replayed and compared.

use std::collections::BTreeMap;
use std::time::Instant;

use contracts::config::{RuntimeConfig, WriterBinding};
use contracts::errors::RuntimeError;
use contracts::Runtime;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::ids::{Address, Name, TokenId};
use types::numeric::Amount;

use crate::metrics::SimMetrics;

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed; identical seeds produce identical runs
    pub seed: u64,
    /// Number of distinct wallet owners
    pub users: usize,
    /// Number of tokens issued to the treasury
    pub tokens: usize,
    /// Actions performed by [`SimEngine::run`]
    pub operations: usize,
    /// Supply minted per token
    pub initial_supply: u64,
    /// Upper bound for funding and transfer amounts
    pub max_amount: u64,
    /// Size of the name pool; smaller pools mean more collisions
    pub name_pool: usize,
    /// Configuration of the runtime under test
    pub runtime: RuntimeConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            users: 16,
            tokens: 3,
            operations: 1_000,
            initial_supply: 1_000_000,
            max_amount: 500,
            name_pool: 64,
            runtime: RuntimeConfig::default(),
        }
    }
}

/// One user action, recorded in the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimAction {
    CreateWallet {
        user: usize,
        name: String,
    },
    /// Treasury sends tokens to a wallet.
    FundWallet {
        token: usize,
        wallet: String,
        amount: u64,
    },
    /// Owner moves tokens from their wallet to another name.
    WalletTransfer {
        user: usize,
        wallet: String,
        to_name: String,
        token: usize,
        amount: u64,
    },
    /// Stranger tries to move tokens out of someone else's wallet.
    NonOwnerProbe {
        wallet: String,
        token: usize,
        amount: u64,
    },
    /// Owner reads every token balance at once.
    BatchBalances {
        user: usize,
        wallet: String,
    },
}

impl SimAction {
    pub fn label(&self) -> &'static str {
        match self {
            SimAction::CreateWallet { .. } => "create_wallet",
            SimAction::FundWallet { .. } => "fund_wallet",
            SimAction::WalletTransfer { .. } => "wallet_transfer",
            SimAction::NonOwnerProbe { .. } => "non_owner_probe",
            SimAction::BatchBalances { .. } => "batch_balances",
        }
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimOutcome {
    Applied,
    Rejected { kind: String },
}

impl SimOutcome {
    fn from_result<T>(result: &Result<T, RuntimeError>) -> Self {
        match result {
            Ok(_) => SimOutcome::Applied,
            Err(err) => SimOutcome::Rejected {
                kind: err.kind().to_string(),
            },
        }
    }

    fn rejected(kind: &str) -> Self {
        SimOutcome::Rejected {
            kind: kind.to_string(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, SimOutcome::Applied)
    }

    /// Error kind for rejected actions.
    pub fn kind(&self) -> Option<&str> {
        match self {
            SimOutcome::Applied => None,
            SimOutcome::Rejected { kind } => Some(kind),
        }
    }
}

/// Seeded simulation over one runtime.
pub struct SimEngine {
    config: SimConfig,
    runtime: Runtime,
    rng: ChaCha8Rng,
    treasury: Address,
    stranger: Address,
    users: Vec<Address>,
    tokens: Vec<TokenId>,
    /// Wallet name -> owning user index, for every wallet created so far
    owners: BTreeMap<String, usize>,
    pub actions: Vec<SimAction>,
    pub metrics: SimMetrics,
}

impl SimEngine {
    /// Deploy a runtime, issue the tokens and derive the user set.
    pub fn new(config: SimConfig) -> Result<Self, RuntimeError> {
        let seed = config.seed.to_le_bytes();
        let treasury = Address::derive(b"sim-treasury", &[&seed]);
        let stranger = Address::derive(b"sim-stranger", &[&seed]);
        let users = (0..config.users as u64)
            .map(|i| Address::derive(b"sim-user", &[&seed, &i.to_le_bytes()]))
            .collect();

        let mut runtime = Runtime::with_config(config.runtime.clone())?;
        if config.runtime.writer_binding == WriterBinding::Explicit {
            let deployer = *runtime.deployer();
            runtime.bind_factory(&deployer)?;
        }
        let mut tokens = Vec::with_capacity(config.tokens);
        for i in 0..config.tokens {
            let symbol = format!("TK{}", i);
            tokens.push(runtime.issue_token(&symbol, treasury, Amount::from_u64(config.initial_supply))?);
        }

        info!(
            seed = config.seed,
            users = config.users,
            tokens = config.tokens,
            "Simulation engine ready"
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            runtime,
            treasury,
            stranger,
            users,
            tokens,
            owners: BTreeMap::new(),
            actions: Vec::new(),
            metrics: SimMetrics::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn treasury(&self) -> &Address {
        &self.treasury
    }

    pub fn users(&self) -> &[Address] {
        &self.users
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Wallet names created so far, with the owning user index.
    pub fn owners(&self) -> &BTreeMap<String, usize> {
        &self.owners
    }

    /// Pick, apply and record one random action.
    pub fn step(&mut self) -> (SimAction, SimOutcome) {
        let action = self.next_action();
        let started = Instant::now();
        let outcome = self.apply(&action);
        self.metrics.record_latency(started.elapsed().as_nanos() as u64);
        self.metrics.record(&action, &outcome);
        debug!(action = action.label(), ?outcome, "Simulation step");
        self.actions.push(action.clone());
        (action, outcome)
    }

    /// Run `config.operations` steps.
    pub fn run(&mut self) {
        let started = Instant::now();
        for _ in 0..self.config.operations {
            self.step();
        }
        self.metrics.set_elapsed(started.elapsed().as_nanos() as u64);
        info!(summary = %self.metrics.summary(), "Simulation finished");
    }

    /// Apply an action without touching the RNG.
    pub fn apply(&mut self, action: &SimAction) -> SimOutcome {
        match action {
            SimAction::CreateWallet { user, name } => {
                let Some(owner) = self.users.get(*user).copied() else {
                    return SimOutcome::rejected("unknown_user");
                };
                let Ok(encoded) = Name::encode(name) else {
                    return SimOutcome::rejected("invalid_name");
                };
                let result = self.runtime.create_wallet(&owner, encoded);
                if result.is_ok() {
                    self.owners.insert(name.clone(), *user);
                }
                SimOutcome::from_result(&result)
            }
            SimAction::FundWallet {
                token,
                wallet,
                amount,
            } => {
                let (Some(token), Some(wallet)) = (self.tokens.get(*token).copied(), self.wallet_address(wallet)) else {
                    return SimOutcome::rejected("unknown_target");
                };
                let result =
                    self.runtime
                        .token_transfer(&self.treasury, &token, &wallet, Amount::from_u64(*amount));
                SimOutcome::from_result(&result)
            }
            SimAction::WalletTransfer {
                user,
                wallet,
                to_name,
                token,
                amount,
            } => {
                let (Some(caller), Some(token), Some(wallet)) = (
                    self.users.get(*user).copied(),
                    self.tokens.get(*token).copied(),
                    self.wallet_address(wallet),
                ) else {
                    return SimOutcome::rejected("unknown_target");
                };
                let Ok(to_name) = Name::encode(to_name) else {
                    return SimOutcome::rejected("invalid_name");
                };
                let result = self.runtime.wallet_transfer(
                    &caller,
                    &wallet,
                    &to_name,
                    Amount::from_u64(*amount),
                    &token,
                );
                SimOutcome::from_result(&result)
            }
            SimAction::NonOwnerProbe {
                wallet,
                token,
                amount,
            } => {
                let (Some(token), Some(wallet)) = (self.tokens.get(*token).copied(), self.wallet_address(wallet)) else {
                    return SimOutcome::rejected("unknown_target");
                };
                let to_name = self.runtime.wallet(&wallet).map(|w| *w.name());
                let Some(to_name) = to_name else {
                    return SimOutcome::rejected("unknown_target");
                };
                let result = self.runtime.wallet_transfer(
                    &self.stranger,
                    &wallet,
                    &to_name,
                    Amount::from_u64(*amount),
                    &token,
                );
                SimOutcome::from_result(&result)
            }
            SimAction::BatchBalances { user, wallet } => {
                let (Some(caller), Some(wallet)) = (self.users.get(*user).copied(), self.wallet_address(wallet)) else {
                    return SimOutcome::rejected("unknown_target");
                };
                let result = self.runtime.wallet_balances(&caller, &wallet, &self.tokens);
                SimOutcome::from_result(&result)
            }
        }
    }

    fn wallet_address(&self, name: &str) -> Option<Address> {
        let name = Name::encode(name).ok()?;
        self.runtime.wallet_by_name(&name).map(|wallet| *wallet.address())
    }

    fn random_name(&mut self) -> String {
        let pool = self.config.name_pool.max(1);
        format!("user{}.eth", self.rng.gen_range(0..pool))
    }

    fn random_amount(&mut self) -> u64 {
        self.rng.gen_range(0..=self.config.max_amount)
    }

    fn next_action(&mut self) -> SimAction {
        let users = self.users.len().max(1);
        let tokens = self.tokens.len().max(1);

        // Everything except creation needs an existing wallet
        if self.owners.is_empty() || self.rng.gen_bool(0.2) {
            let user = self.rng.gen_range(0..users);
            let name = self.random_name();
            return SimAction::CreateWallet { user, name };
        }

        let pick = self.rng.gen_range(0..self.owners.len());
        let picked = self
            .owners
            .iter()
            .nth(pick)
            .map(|(name, owner)| (name.clone(), *owner));
        let Some((wallet, owner)) = picked else {
            let user = self.rng.gen_range(0..users);
            let name = self.random_name();
            return SimAction::CreateWallet { user, name };
        };

        match self.rng.gen_range(0..10u32) {
            0..=2 => SimAction::FundWallet {
                token: self.rng.gen_range(0..tokens),
                wallet,
                amount: self.random_amount(),
            },
            3..=6 => SimAction::WalletTransfer {
                user: owner,
                wallet,
                to_name: self.random_name(),
                token: self.rng.gen_range(0..tokens),
                amount: self.random_amount(),
            },
            7 => SimAction::NonOwnerProbe {
                wallet,
                token: self.rng.gen_range(0..tokens),
                amount: self.random_amount(),
            },
            _ => SimAction::BatchBalances { user: owner, wallet },
        }
    }

    /// Check global invariants against committed state. Returns one message
    /// per violation; empty means healthy.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        // Every unit of every token sits with the treasury or in a wallet
        for token in &self.tokens {
            let supply = match self.runtime.total_supply(token) {
                Ok(supply) => supply,
                Err(err) => {
                    violations.push(format!("token {}: {}", token, err));
                    continue;
                }
            };
            let mut held = self.runtime.token_balance(token, &self.treasury).unwrap_or(Amount::ZERO);
            for wallet in self.runtime.wallets() {
                let balance = self.runtime.token_balance(token, wallet.address()).unwrap_or(Amount::ZERO);
                match held.checked_add(balance) {
                    Some(sum) => held = sum,
                    None => violations.push(format!("token {}: balance sum overflows", token)),
                }
            }
            if held != supply {
                violations.push(format!("token {}: held {} != supply {}", token, held, supply));
            }
        }

        if self.runtime.name_count() != self.runtime.wallet_count() {
            violations.push(format!(
                "{} names but {} wallets",
                self.runtime.name_count(),
                self.runtime.wallet_count()
            ));
        }
        for (name, account) in self.runtime.registry_entries() {
            match self.runtime.wallet(account) {
                Some(wallet) if wallet.name() == name => {}
                Some(_) => violations.push(format!("name {} bound to a wallet with another name", name)),
                None => violations.push(format!("name {} bound to {} which is not a wallet", name, account)),
            }
        }

        for (name, user) in &self.owners {
            let owner = self.users.get(*user);
            let wallet = self.wallet_address(name).and_then(|address| self.runtime.wallet(&address));
            match (wallet, owner) {
                (Some(wallet), Some(owner)) if wallet.owner() == owner => {}
                _ => violations.push(format!("wallet {} lost its owner binding", name)),
            }
        }

        violations
    }

    /// Committed balances of every wallet, keyed by wallet name.
    pub fn wallet_balances(&self) -> BTreeMap<String, Vec<Amount>> {
        self.runtime
            .wallets()
            .map(|wallet| {
                let balances = self
                    .tokens
                    .iter()
                    .map(|token| self.runtime.token_balance(token, wallet.address()).unwrap_or(Amount::ZERO))
                    .collect();
                (wallet.name().to_string(), balances)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            seed: 7,
            users: 4,
            tokens: 2,
            operations: 200,
            initial_supply: 10_000,
            max_amount: 100,
            name_pool: 8,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimEngine::new(small_config()).unwrap();
        assert_eq!(engine.users().len(), 4);
        assert_eq!(engine.tokens().len(), 2);
        assert_eq!(
            engine.runtime().token_balance(&engine.tokens()[0], engine.treasury()).unwrap(),
            Amount::from_u64(10_000)
        );
        assert!(engine.check_invariants().is_empty());
    }

    #[test]
    fn test_first_action_creates_wallet() {
        let mut engine = SimEngine::new(small_config()).unwrap();
        let (action, outcome) = engine.step();
        assert!(matches!(action, SimAction::CreateWallet { .. }));
        assert!(outcome.is_applied());
        assert_eq!(engine.owners().len(), 1);
    }

    #[test]
    fn test_apply_scripted_actions() {
        let mut engine = SimEngine::new(small_config()).unwrap();
        let create = |user: usize, name: &str| SimAction::CreateWallet {
            user,
            name: name.to_string(),
        };

        assert!(engine.apply(&create(0, "alice")).is_applied());
        assert!(engine.apply(&create(1, "bob")).is_applied());
        assert_eq!(engine.apply(&create(2, "alice")).kind(), Some("name_already_used"));

        let fund = SimAction::FundWallet {
            token: 0,
            wallet: "alice".to_string(),
            amount: 50,
        };
        assert!(engine.apply(&fund).is_applied());

        let transfer = SimAction::WalletTransfer {
            user: 0,
            wallet: "alice".to_string(),
            to_name: "bob".to_string(),
            token: 0,
            amount: 20,
        };
        assert!(engine.apply(&transfer).is_applied());

        let overdraw = SimAction::WalletTransfer {
            user: 0,
            wallet: "alice".to_string(),
            to_name: "bob".to_string(),
            token: 0,
            amount: 31,
        };
        assert_eq!(engine.apply(&overdraw).kind(), Some("transfer_failed"));

        let ghost = SimAction::WalletTransfer {
            user: 0,
            wallet: "alice".to_string(),
            to_name: "ghost".to_string(),
            token: 0,
            amount: 1,
        };
        assert_eq!(engine.apply(&ghost).kind(), Some("unknown_recipient"));

        let probe = SimAction::NonOwnerProbe {
            wallet: "alice".to_string(),
            token: 0,
            amount: 1,
        };
        assert_eq!(engine.apply(&probe).kind(), Some("not_owner"));

        let balances = engine.wallet_balances();
        assert_eq!(balances["alice"], vec![Amount::from_u64(30), Amount::ZERO]);
        assert_eq!(balances["bob"], vec![Amount::from_u64(20), Amount::ZERO]);
        assert!(engine.check_invariants().is_empty());
    }

    #[test]
    fn test_apply_unknown_wallet() {
        let mut engine = SimEngine::new(small_config()).unwrap();
        let action = SimAction::BatchBalances {
            user: 0,
            wallet: "nobody".to_string(),
        };
        assert_eq!(engine.apply(&action).kind(), Some("unknown_target"));
    }

    #[test]
    fn test_run_keeps_invariants() {
        let mut engine = SimEngine::new(small_config()).unwrap();
        engine.run();
        assert_eq!(engine.actions.len(), 200);
        assert_eq!(engine.metrics.total_actions, 200);
        let violations = engine.check_invariants();
        assert!(violations.is_empty(), "violations: {:?}", violations);
    }

    #[test]
    fn test_same_seed_same_actions() {
        let mut a = SimEngine::new(small_config()).unwrap();
        let mut b = SimEngine::new(small_config()).unwrap();
        a.run();
        b.run();
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.wallet_balances(), b.wallet_balances());
    }

    #[test]
    fn test_probes_never_succeed() {
        let mut engine = SimEngine::new(small_config()).unwrap();
        for _ in 0..300 {
            let (action, outcome) = engine.step();
            if let SimAction::NonOwnerProbe { .. } = action {
                assert_eq!(outcome.kind(), Some("not_owner"));
            }
        }
    }

    #[test]
    fn test_explicit_binding_runtime() {
        let config = SimConfig {
            runtime: RuntimeConfig {
                writer_binding: WriterBinding::Explicit,
                ..RuntimeConfig::default()
            },
            ..small_config()
        };
        let mut engine = SimEngine::new(config).unwrap();
        assert_eq!(
            engine.runtime().registry_writer(),
            Some(engine.runtime().factory_address())
        );

        engine.run();
        assert!(engine.metrics.wallets_created > 0);
        assert!(engine.check_invariants().is_empty());
    }

    #[test]
    fn test_batch_limit_from_runtime_config() {
        let config = SimConfig {
            runtime: RuntimeConfig {
                max_batch_tokens: 1,
                ..RuntimeConfig::default()
            },
            ..small_config()
        };
        let mut engine = SimEngine::new(config).unwrap();
        engine.apply(&SimAction::CreateWallet {
            user: 0,
            name: "alice".to_string(),
        });

        // Two tokens against a limit of one
        let batch = SimAction::BatchBalances {
            user: 0,
            wallet: "alice".to_string(),
        };
        assert_eq!(engine.apply(&batch).kind(), Some("wallet"));
    }

    #[test]
    fn test_invalid_runtime_config_rejected() {
        let config = SimConfig {
            runtime: RuntimeConfig {
                max_batch_tokens: 0,
                ..RuntimeConfig::default()
            },
            ..small_config()
        };
        assert!(SimEngine::new(config).is_err());
    }

    #[test]
    fn test_action_serde_shape() {
        let action = SimAction::CreateWallet {
            user: 1,
            name: "alice".to_string(),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"type\":\"create_wallet\""));
        let parsed: SimAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }
}
