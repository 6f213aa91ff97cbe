//! Fungible token ledgers
//!
//! Wallets never hold balances themselves: they query and move balances in
//! a ledger, one ledger per token, through the narrow [`FungibleToken`]
//! interface. [`TokenLedger`] is the in-memory reference ledger (fixed
//! supply minted to an issuer at creation); [`LedgerSet`] holds every
//! listed token keyed by [`TokenId`].

use std::collections::HashMap;
use std::fmt;

use tracing::debug;
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::errors::LedgerError;
use crate::journal::{StagedMap, Transactional};

/// Interface every token ledger exposes to wallets.
///
/// Writes must be staged so that the runtime can commit or discard them
/// together with the rest of an operation.
pub trait FungibleToken: Transactional + fmt::Debug {
    fn id(&self) -> TokenId;

    fn symbol(&self) -> &str;

    fn total_supply(&self) -> Amount;

    fn balance_of(&self, account: &Address) -> Amount;

    /// Move `amount` from `from` to `to`. On error nothing is written.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError>;
}

/// Reference in-memory token ledger.
#[derive(Debug)]
pub struct TokenLedger {
    id: TokenId,
    symbol: String,
    total_supply: Amount,
    balances: StagedMap<Address, Amount>,
}

impl TokenLedger {
    /// Create a ledger and mint the whole supply to `issuer`.
    pub fn new(id: TokenId, symbol: impl Into<String>, issuer: Address, supply: Amount) -> Self {
        let mut balances = StagedMap::new();
        balances.insert(issuer, supply);
        balances.commit();
        Self {
            id,
            symbol: symbol.into(),
            total_supply: supply,
            balances,
        }
    }

    /// Accounts with a committed non-zero balance.
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        self.balances
            .iter_committed()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(account, amount)| (*account, *amount))
            .collect()
    }
}

impl FungibleToken for TokenLedger {
    fn id(&self) -> TokenId {
        self.id
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                token: self.id,
                required: amount,
                available,
            })?;

        // Self transfers leave the balance untouched
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);

        debug!(
            token = %self.id,
            symbol = %self.symbol,
            %from,
            %to,
            %amount,
            "Ledger transfer staged"
        );
        Ok(())
    }
}

impl Transactional for TokenLedger {
    fn commit(&mut self) {
        self.balances.commit();
    }

    fn rollback(&mut self) {
        self.balances.rollback();
    }

    fn has_pending(&self) -> bool {
        self.balances.has_pending()
    }
}

/// Every token ledger known to the runtime.
#[derive(Debug, Default)]
pub struct LedgerSet {
    tokens: HashMap<TokenId, Box<dyn FungibleToken>>,
    /// Listing order, for deterministic iteration
    order: Vec<TokenId>,
}

impl LedgerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ledger. Each token id may be listed once, and only with
    /// nothing staged.
    pub fn list(&mut self, ledger: Box<dyn FungibleToken>) -> Result<TokenId, LedgerError> {
        let token = ledger.id();
        if self.tokens.contains_key(&token) {
            return Err(LedgerError::TokenAlreadyListed { token });
        }
        if ledger.has_pending() {
            return Err(LedgerError::PendingWrites { token });
        }
        self.tokens.insert(token, ledger);
        self.order.push(token);
        Ok(token)
    }

    pub fn get(&self, token: &TokenId) -> Option<&dyn FungibleToken> {
        self.tokens.get(token).map(|ledger| ledger.as_ref())
    }

    pub fn get_mut(&mut self, token: &TokenId) -> Option<&mut (dyn FungibleToken + 'static)> {
        self.tokens.get_mut(token).map(|ledger| ledger.as_mut())
    }

    /// Listed token ids, in listing order.
    pub fn ids(&self) -> &[TokenId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Transactional for LedgerSet {
    fn commit(&mut self) {
        for ledger in self.tokens.values_mut() {
            ledger.commit();
        }
    }

    fn rollback(&mut self) {
        for ledger in self.tokens.values_mut() {
            ledger.rollback();
        }
    }

    fn has_pending(&self) -> bool {
        self.tokens.values().any(|ledger| ledger.has_pending())
    }
}
