//! Wallet factory — claims a name and provisions its wallet
//!
//! The factory is the registry's only authorized writer. Creating a wallet
//! reserves the name first and only then instantiates the wallet, so a
//! taken name never leaves an orphaned wallet behind.

use tracing::info;
use types::ids::{Address, Name};

use crate::errors::FactoryError;
use crate::events::{NameReserved, WalletCreated};
use crate::registry::NameRegistry;
use crate::wallet::{Wallet, WalletTable};

/// Domain tag for wallet address derivation.
const WALLET_DOMAIN: &[u8] = b"wallet";

/// Everything a successful [`WalletFactory::create_wallet`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub reserved: NameReserved,
    pub created: WalletCreated,
}

/// Stateless wallet provisioner identified by its own address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletFactory {
    address: Address,
}

impl WalletFactory {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Identity the factory presents to the registry.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Address the wallet for `name` receives from this factory.
    pub fn predict_address(&self, name: &Name) -> Address {
        Address::derive(WALLET_DOMAIN, &[self.address.as_bytes(), name.as_bytes()])
    }

    /// Reserve `name` and provision a wallet owned by `caller`.
    pub fn create_wallet(
        &self,
        caller: &Address,
        name: Name,
        registry: &mut NameRegistry,
        wallets: &mut WalletTable,
    ) -> Result<Provisioned, FactoryError> {
        if caller.is_zero() {
            return Err(FactoryError::ZeroOwner);
        }

        let wallet_address = self.predict_address(&name);
        let reserved = registry.reserve(&self.address, name, wallet_address)?;

        wallets.insert(wallet_address, Wallet::new(wallet_address, name, *caller));

        info!(%name, wallet = %wallet_address, owner = %caller, "Wallet created");
        Ok(Provisioned {
            reserved,
            created: WalletCreated {
                name,
                wallet: wallet_address,
                owner: *caller,
            },
        })
    }
}
