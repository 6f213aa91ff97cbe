//! Runtime — host execution environment
//!
//! Owns the registry, the factory, every wallet, every token ledger and the
//! event log, and executes each mutating call as one indivisible unit:
//! either every staged write of the call commits, or none does and the
//! error is returned. Caller identity is an explicit argument of every
//! call. Mutating calls take `&mut self`, reads take `&self`, so calls are
//! totally ordered and reads only ever observe committed state.

use tracing::{debug, info, warn};
use types::ids::{Address, Name, TokenId};
use types::numeric::Amount;

use crate::config::{RuntimeConfig, WriterBinding};
use crate::errors::{LedgerError, RuntimeError, WalletError};
use crate::events::{EventLog, EventRecord, Transfer};
use crate::factory::WalletFactory;
use crate::journal::Transactional;
use crate::ledger::{FungibleToken, LedgerSet, TokenLedger};
use crate::registry::NameRegistry;
use crate::wallet::{Wallet, WalletTable};

/// Domain tag for factory address derivation.
const FACTORY_DOMAIN: &[u8] = b"factory";

#[derive(Debug)]
struct State {
    registry: NameRegistry,
    factory: WalletFactory,
    wallets: WalletTable,
    ledgers: LedgerSet,
    events: EventLog,
}

impl Transactional for State {
    fn commit(&mut self) {
        self.registry.commit();
        self.wallets.commit();
        self.ledgers.commit();
        self.events.commit();
    }

    fn rollback(&mut self) {
        self.registry.rollback();
        self.wallets.rollback();
        self.ledgers.rollback();
        self.events.rollback();
    }

    fn has_pending(&self) -> bool {
        self.registry.has_pending()
            || self.wallets.has_pending()
            || self.ledgers.has_pending()
            || self.events.has_pending()
    }
}

/// The deployed system: registry + factory + wallets + ledgers.
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    state: State,
}

impl Runtime {
    /// Deploy with the default configuration.
    pub fn new() -> Self {
        Self::deploy(RuntimeConfig::default())
    }

    /// Deploy with a custom configuration.
    pub fn with_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self::deploy(config))
    }

    fn deploy(config: RuntimeConfig) -> Self {
        let deployer = config.deployer;
        let factory = WalletFactory::new(Address::derive(FACTORY_DOMAIN, &[deployer.as_bytes()]));
        let registry = match config.writer_binding {
            WriterBinding::AtDeploy => NameRegistry::with_writer(deployer, *factory.address()),
            WriterBinding::Explicit => NameRegistry::new(deployer),
        };

        info!(
            %deployer,
            factory = %factory.address(),
            writer_binding = ?config.writer_binding,
            "Runtime deployed"
        );

        Self {
            config,
            state: State {
                registry,
                factory,
                wallets: WalletTable::new(),
                ledgers: LedgerSet::new(),
                events: EventLog::new(),
            },
        }
    }

    /// Run `op` as one atomic unit.
    fn execute<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut State) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        debug_assert!(!self.state.has_pending(), "staged writes outside an operation");
        match op(&mut self.state) {
            Ok(value) => {
                self.state.commit();
                debug!(operation, "Operation committed");
                Ok(value)
            }
            Err(err) => {
                self.state.rollback();
                warn!(operation, kind = err.kind(), error = %err, "Operation reverted");
                Err(err)
            }
        }
    }

    // ───────────────────────── Deployment ─────────────────────────

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn deployer(&self) -> &Address {
        &self.config.deployer
    }

    pub fn factory_address(&self) -> &Address {
        self.state.factory.address()
    }

    pub fn registry_writer(&self) -> Option<&Address> {
        self.state.registry.writer()
    }

    /// Authorize the factory as registry writer. Deployer-only, once.
    ///
    /// Required before the first wallet when the runtime was deployed with
    /// [`WriterBinding::Explicit`].
    pub fn bind_factory(&mut self, caller: &Address) -> Result<(), RuntimeError> {
        self.execute("bind_factory", |state| {
            let factory = *state.factory.address();
            state.registry.bind_writer(caller, factory)?;
            Ok(())
        })
    }

    // ───────────────────────── Tokens ─────────────────────────

    /// List an externally provided token ledger.
    pub fn list_token(&mut self, ledger: Box<dyn FungibleToken>) -> Result<TokenId, RuntimeError> {
        let symbol = ledger.symbol().to_string();
        let token = self.state.ledgers.list(ledger)?;
        info!(%token, %symbol, "Token listed");
        Ok(token)
    }

    /// Create and list a reference ledger minting `supply` to `issuer`.
    pub fn issue_token(
        &mut self,
        symbol: &str,
        issuer: Address,
        supply: Amount,
    ) -> Result<TokenId, RuntimeError> {
        let token = TokenId::derive(symbol, &issuer);
        self.list_token(Box::new(TokenLedger::new(token, symbol, issuer, supply)))
    }

    pub fn token_ids(&self) -> &[TokenId] {
        self.state.ledgers.ids()
    }

    pub fn token_balance(&self, token: &TokenId, account: &Address) -> Result<Amount, RuntimeError> {
        Ok(self.ledger(token)?.balance_of(account))
    }

    pub fn total_supply(&self, token: &TokenId) -> Result<Amount, RuntimeError> {
        Ok(self.ledger(token)?.total_supply())
    }

    /// Plain holder-to-address transfer on a ledger (e.g. funding a wallet).
    pub fn token_transfer(
        &mut self,
        caller: &Address,
        token: &TokenId,
        to: &Address,
        amount: Amount,
    ) -> Result<Transfer, RuntimeError> {
        self.execute("token_transfer", |state| {
            let ledger = state
                .ledgers
                .get_mut(token)
                .ok_or(LedgerError::UnknownToken { token: *token })?;
            ledger.transfer(caller, to, amount)?;

            let transfer = Transfer {
                token: *token,
                from: *caller,
                to: *to,
                amount,
            };
            state.events.emit(transfer.clone());
            Ok(transfer)
        })
    }

    fn ledger(&self, token: &TokenId) -> Result<&dyn FungibleToken, RuntimeError> {
        self.state
            .ledgers
            .get(token)
            .ok_or_else(|| LedgerError::UnknownToken { token: *token }.into())
    }

    // ───────────────────────── Registry ─────────────────────────

    /// Bind `name` to `account`. Only the factory identity is authorized.
    pub fn reserve_name(
        &mut self,
        caller: &Address,
        name: Name,
        account: Address,
    ) -> Result<(), RuntimeError> {
        self.execute("reserve_name", |state| {
            let reserved = state.registry.reserve(caller, name, account)?;
            state.events.emit(reserved);
            Ok(())
        })
    }

    pub fn resolve(&self, name: &Name) -> Address {
        self.state.registry.resolve(name)
    }

    pub fn lookup(&self, name: &Name) -> Option<Address> {
        self.state.registry.lookup(name)
    }

    pub fn is_available(&self, name: &Name) -> bool {
        self.state.registry.is_available(name)
    }

    pub fn name_count(&self) -> usize {
        self.state.registry.len()
    }

    /// Every committed `(name, account)` binding.
    pub fn registry_entries(&self) -> impl Iterator<Item = (&Name, &Address)> {
        self.state.registry.entries()
    }

    // ───────────────────────── Factory ─────────────────────────

    /// Claim `name` and provision a wallet owned by `caller`.
    pub fn create_wallet(&mut self, caller: &Address, name: Name) -> Result<Address, RuntimeError> {
        self.execute("create_wallet", |state| {
            let provisioned = state.factory.create_wallet(
                caller,
                name,
                &mut state.registry,
                &mut state.wallets,
            )?;
            let wallet = provisioned.created.wallet;
            state.events.emit(provisioned.reserved);
            state.events.emit(provisioned.created);
            Ok(wallet)
        })
    }

    pub fn predict_wallet_address(&self, name: &Name) -> Address {
        self.state.factory.predict_address(name)
    }

    // ───────────────────────── Wallets ─────────────────────────

    pub fn wallet(&self, address: &Address) -> Option<&Wallet> {
        self.state.wallets.get(address)
    }

    pub fn wallet_by_name(&self, name: &Name) -> Option<&Wallet> {
        self.lookup(name).and_then(|address| self.wallet(&address))
    }

    pub fn wallet_count(&self) -> usize {
        self.state.wallets.len()
    }

    /// Every committed wallet, in no particular order.
    pub fn wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.state.wallets.iter_committed().map(|(_, wallet)| wallet)
    }

    pub fn wallet_balance(
        &self,
        caller: &Address,
        wallet: &Address,
        token: &TokenId,
    ) -> Result<Amount, RuntimeError> {
        let wallet = self.find_wallet(wallet)?;
        Ok(wallet.get_balance(caller, token, &self.state.ledgers)?)
    }

    pub fn wallet_balances(
        &self,
        caller: &Address,
        wallet: &Address,
        tokens: &[TokenId],
    ) -> Result<Vec<Amount>, RuntimeError> {
        let wallet = self.find_wallet(wallet)?;
        // Ownership before the batch limit
        wallet.only_owner(caller)?;
        if tokens.len() > self.config.max_batch_tokens {
            return Err(WalletError::BatchTooLarge {
                requested: tokens.len(),
                max: self.config.max_batch_tokens,
            }
            .into());
        }
        Ok(wallet.get_all_balances(caller, tokens, &self.state.ledgers)?)
    }

    /// Move tokens out of `wallet` to whoever `to_name` is bound to.
    pub fn wallet_transfer(
        &mut self,
        caller: &Address,
        wallet: &Address,
        to_name: &Name,
        amount: Amount,
        token: &TokenId,
    ) -> Result<Transfer, RuntimeError> {
        self.execute("wallet_transfer", |state| {
            let source = state
                .wallets
                .get(wallet)
                .ok_or(WalletError::NotFound { wallet: *wallet })?;
            let transfer = source.transfer(
                caller,
                to_name,
                amount,
                token,
                &state.registry,
                &mut state.ledgers,
            )?;
            state.events.emit(transfer.clone());
            Ok(transfer)
        })
    }

    fn find_wallet(&self, address: &Address) -> Result<&Wallet, RuntimeError> {
        self.wallet(address)
            .ok_or_else(|| WalletError::NotFound { wallet: *address }.into())
    }

    // ───────────────────────── Events ─────────────────────────

    /// Committed events in sequence order.
    pub fn events(&self) -> &[EventRecord] {
        self.state.events.records()
    }

    /// Drain all committed events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.state.events.drain()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RegistryError;
    use crate::events::ContractEvent;

    fn name(text: &str) -> Name {
        Name::encode(text).unwrap()
    }

    fn setup_runtime() -> (Runtime, TokenId, Address) {
        let mut runtime = Runtime::new();
        let treasury = Address::new();
        let coin = runtime
            .issue_token("COIN", treasury, Amount::from_u64(1_000))
            .unwrap();
        (runtime, coin, treasury)
    }

    #[test]
    fn test_deploy_binds_factory() {
        let runtime = Runtime::new();
        assert_eq!(runtime.registry_writer(), Some(runtime.factory_address()));
    }

    #[test]
    fn test_explicit_binding_required() {
        let config = RuntimeConfig {
            writer_binding: WriterBinding::Explicit,
            ..RuntimeConfig::default()
        };
        let mut runtime = Runtime::with_config(config).unwrap();
        let user = Address::new();

        let result = runtime.create_wallet(&user, name("alice"));
        assert_eq!(
            result,
            Err(RuntimeError::Factory(RegistryError::WriterNotBound.into()))
        );

        let deployer = *runtime.deployer();
        runtime.bind_factory(&deployer).unwrap();
        assert!(runtime.create_wallet(&user, name("alice")).is_ok());
    }

    #[test]
    fn test_bind_factory_twice() {
        let mut runtime = Runtime::new();
        let deployer = *runtime.deployer();
        let result = runtime.bind_factory(&deployer);
        assert!(matches!(
            result,
            Err(RuntimeError::Registry(RegistryError::WriterAlreadyBound { .. }))
        ));
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = RuntimeConfig {
            max_batch_tokens: 0,
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            Runtime::with_config(config),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn test_create_wallet_emits_events() {
        let (mut runtime, _, _) = setup_runtime();
        let owner = Address::new();
        let wallet = runtime.create_wallet(&owner, name("addr1.eth")).unwrap();

        let events = runtime.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, ContractEvent::NameReserved(_)));
        match &events[1].event {
            ContractEvent::WalletCreated(created) => {
                assert_eq!(created.name, name("addr1.eth"));
                assert_eq!(created.wallet, wallet);
                assert_eq!(created.owner, owner);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_failed_create_wallet_emits_nothing() {
        let (mut runtime, _, _) = setup_runtime();
        runtime.create_wallet(&Address::new(), name("alice")).unwrap();
        let before = runtime.events().len();

        let err = runtime
            .create_wallet(&Address::new(), name("alice"))
            .unwrap_err();
        assert!(err.is_name_already_used());
        assert_eq!(runtime.events().len(), before);
        assert_eq!(runtime.wallet_count(), 1);
    }

    #[test]
    fn test_wallet_transfer_failure_rolls_back() {
        let (mut runtime, coin, treasury) = setup_runtime();
        let owner = Address::new();
        let wallet = runtime.create_wallet(&owner, name("alice")).unwrap();
        runtime.create_wallet(&Address::new(), name("bob")).unwrap();
        runtime
            .token_transfer(&treasury, &coin, &wallet, Amount::from_u64(10))
            .unwrap();

        let err = runtime
            .wallet_transfer(&owner, &wallet, &name("bob"), Amount::from_u64(50), &coin)
            .unwrap_err();
        assert!(err.is_transfer_failed());
        assert_eq!(
            runtime.wallet_balance(&owner, &wallet, &coin).unwrap(),
            Amount::from_u64(10)
        );
    }

    #[test]
    fn test_wallet_not_found() {
        let (runtime, coin, _) = setup_runtime();
        let ghost = Address::new();
        let result = runtime.wallet_balance(&Address::new(), &ghost, &coin);
        assert_eq!(
            result,
            Err(RuntimeError::Wallet(WalletError::NotFound { wallet: ghost }))
        );
    }

    #[test]
    fn test_batch_too_large() {
        let config = RuntimeConfig {
            max_batch_tokens: 2,
            ..RuntimeConfig::default()
        };
        let mut runtime = Runtime::with_config(config).unwrap();
        let coin = runtime
            .issue_token("COIN", Address::new(), Amount::from_u64(1))
            .unwrap();
        let owner = Address::new();
        let wallet = runtime.create_wallet(&owner, name("alice")).unwrap();

        let result = runtime.wallet_balances(&owner, &wallet, &[coin, coin, coin]);
        assert_eq!(
            result,
            Err(RuntimeError::Wallet(WalletError::BatchTooLarge {
                requested: 3,
                max: 2
            }))
        );
        assert!(runtime.wallet_balances(&owner, &wallet, &[coin, coin]).is_ok());
    }

    #[test]
    fn test_token_transfer_unknown_token() {
        let (mut runtime, _, treasury) = setup_runtime();
        let bogus = TokenId::from_address(Address::new());
        let result = runtime.token_transfer(&treasury, &bogus, &Address::new(), Amount::from_u64(1));
        assert_eq!(
            result,
            Err(RuntimeError::Ledger(LedgerError::UnknownToken { token: bogus }))
        );
    }

    #[test]
    fn test_issue_same_token_twice() {
        let mut runtime = Runtime::new();
        let issuer = Address::new();
        runtime.issue_token("COIN", issuer, Amount::from_u64(1)).unwrap();
        let result = runtime.issue_token("COIN", issuer, Amount::from_u64(1));
        assert!(matches!(
            result,
            Err(RuntimeError::Ledger(LedgerError::TokenAlreadyListed { .. }))
        ));
        assert_eq!(runtime.token_ids().len(), 1);
    }

    #[test]
    fn test_wallet_by_name() {
        let (mut runtime, _, _) = setup_runtime();
        let owner = Address::new();
        let wallet = runtime.create_wallet(&owner, name("alice")).unwrap();
        assert_eq!(runtime.wallet_by_name(&name("alice")).unwrap().address(), &wallet);
        assert!(runtime.wallet_by_name(&name("bob")).is_none());
        assert_eq!(runtime.predict_wallet_address(&name("alice")), wallet);
    }

    #[test]
    fn test_drain_events() {
        let (mut runtime, _, _) = setup_runtime();
        runtime.create_wallet(&Address::new(), name("alice")).unwrap();
        assert_eq!(runtime.drain_events().len(), 2);
        assert!(runtime.events().is_empty());

        runtime.create_wallet(&Address::new(), name("bob")).unwrap();
        assert_eq!(runtime.events()[0].sequence, 2);
    }
}
