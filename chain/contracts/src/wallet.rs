//! Wallet — per-owner custodial account
//!
//! A wallet holds no balances of its own: every balance lives in a token
//! ledger keyed by the wallet's address. The wallet only queries and moves
//! those balances on behalf of its single, fixed owner, resolving
//! counterparties by name through the registry.

use serde::{Deserialize, Serialize};
use types::ids::{Address, Name, TokenId};
use types::numeric::Amount;

use crate::errors::WalletError;
use crate::events::Transfer;
use crate::journal::StagedMap;
use crate::ledger::{FungibleToken, LedgerSet};
use crate::registry::NameRegistry;
use crate::security::Ownable;

/// Wallets keyed by their own address.
pub type WalletTable = StagedMap<Address, Wallet>;

/// Custodial wallet bound to one name and one owner.
///
/// Constructed only with an owner, so a wallet is active for its whole
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    address: Address,
    name: Name,
    ownership: Ownable,
}

impl Wallet {
    pub fn new(address: Address, name: Name, owner: Address) -> Self {
        Self {
            address,
            name,
            ownership: Ownable::new(owner),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn owner(&self) -> &Address {
        self.ownership.owner()
    }

    // ───────────────────────── Balance Queries ─────────────────────────

    /// Balance of `token` held by this wallet. Owner-only.
    pub fn get_balance(
        &self,
        caller: &Address,
        token: &TokenId,
        ledgers: &LedgerSet,
    ) -> Result<Amount, WalletError> {
        self.only_owner(caller)?;
        self.balance_in(token, ledgers)
    }

    /// Balances of every token in `tokens`, in input order. Owner-only.
    ///
    /// Each entry is an independent ledger query; duplicates are queried
    /// again and an empty list yields an empty result.
    pub fn get_all_balances(
        &self,
        caller: &Address,
        tokens: &[TokenId],
        ledgers: &LedgerSet,
    ) -> Result<Vec<Amount>, WalletError> {
        self.only_owner(caller)?;
        tokens
            .iter()
            .map(|token| self.balance_in(token, ledgers))
            .collect()
    }

    // ───────────────────────── Transfer ─────────────────────────

    /// Send `amount` of `token` to the account bound to `to_name`. Owner-only.
    pub fn transfer(
        &self,
        caller: &Address,
        to_name: &Name,
        amount: Amount,
        token: &TokenId,
        registry: &NameRegistry,
        ledgers: &mut LedgerSet,
    ) -> Result<Transfer, WalletError> {
        self.only_owner(caller)?;

        let recipient = registry
            .lookup(to_name)
            .ok_or(WalletError::UnknownRecipient { name: *to_name })?;

        let ledger = ledgers
            .get_mut(token)
            .ok_or(WalletError::UnknownToken { token: *token })?;

        ledger
            .transfer(&self.address, &recipient, amount)
            .map_err(WalletError::TransferFailed)?;

        Ok(Transfer {
            token: *token,
            from: self.address,
            to: recipient,
            amount,
        })
    }

    // ───────────────────────── Internal ─────────────────────────

    /// Fails with [`WalletError::NotOwner`] unless `caller` owns the wallet.
    pub fn only_owner(&self, caller: &Address) -> Result<(), WalletError> {
        if !self.ownership.is_owner(caller) {
            return Err(WalletError::NotOwner { caller: *caller });
        }
        Ok(())
    }

    fn balance_in(&self, token: &TokenId, ledgers: &LedgerSet) -> Result<Amount, WalletError> {
        ledgers
            .get(token)
            .map(|ledger| ledger.balance_of(&self.address))
            .ok_or(WalletError::UnknownToken { token: *token })
    }
}
