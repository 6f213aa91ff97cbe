//! Contract-specific error types
//!
//! Error taxonomy for registry, ledger, wallet, factory and runtime
//! operations. Every error aborts the operation that raised it; none is
//! fatal to the runtime.

use thiserror::Error;
use types::ids::{Address, Name, TokenId};
use types::numeric::Amount;

/// Registry-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Name already been used: {name}")]
    NameAlreadyUsed { name: Name },

    #[error("Unauthorized: caller {caller} is not the registry writer")]
    Unauthorized { caller: Address },

    #[error("Registry writer not bound")]
    WriterNotBound,

    #[error("Registry writer already bound to {writer}")]
    WriterAlreadyBound { writer: Address },

    #[error("Cannot bind a name to the zero address")]
    ZeroAccount,
}

/// Token ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance for {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: TokenId,
        required: Amount,
        available: Amount,
    },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Transfer to the zero address")]
    ZeroAddress,

    #[error("Unknown token: {token}")]
    UnknownToken { token: TokenId },

    #[error("Token already listed: {token}")]
    TokenAlreadyListed { token: TokenId },

    #[error("Token {token} has uncommitted writes")]
    PendingWrites { token: TokenId },
}

/// Wallet-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Ownable: caller is not the owner")]
    NotOwner { caller: Address },

    #[error("Unknown recipient: {name}")]
    UnknownRecipient { name: Name },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[source] LedgerError),

    #[error("Unknown token: {token}")]
    UnknownToken { token: TokenId },

    #[error("Wallet not found: {wallet}")]
    NotFound { wallet: Address },

    #[error("Too many tokens in balance query: {requested}, at most {max}")]
    BatchTooLarge { requested: usize, max: usize },
}

/// Factory-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactoryError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Wallet owner cannot be the zero address")]
    ZeroOwner,
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Union of every error a runtime call can return
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// Registry conflict, whether raised directly or through the factory.
    pub fn is_name_already_used(&self) -> bool {
        matches!(
            self,
            Self::Registry(RegistryError::NameAlreadyUsed { .. })
                | Self::Factory(FactoryError::Registry(RegistryError::NameAlreadyUsed { .. }))
        )
    }

    pub fn is_not_owner(&self) -> bool {
        matches!(self, Self::Wallet(WalletError::NotOwner { .. }))
    }

    pub fn is_unknown_recipient(&self) -> bool {
        matches!(self, Self::Wallet(WalletError::UnknownRecipient { .. }))
    }

    pub fn is_transfer_failed(&self) -> bool {
        matches!(self, Self::Wallet(WalletError::TransferFailed(_)))
    }

    /// Short stable label, used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(RegistryError::NameAlreadyUsed { .. })
            | Self::Factory(FactoryError::Registry(RegistryError::NameAlreadyUsed { .. })) => {
                "name_already_used"
            }
            Self::Registry(_) | Self::Factory(FactoryError::Registry(_)) => "registry",
            Self::Factory(FactoryError::ZeroOwner) => "zero_owner",
            Self::Wallet(WalletError::NotOwner { .. }) => "not_owner",
            Self::Wallet(WalletError::UnknownRecipient { .. }) => "unknown_recipient",
            Self::Wallet(WalletError::TransferFailed(_)) => "transfer_failed",
            Self::Wallet(_) => "wallet",
            Self::Ledger(_) => "ledger",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_already_used_display() {
        let err = RegistryError::NameAlreadyUsed {
            name: Name::encode("fake.eth").unwrap(),
        };
        assert_eq!(err.to_string(), "Name already been used: fake.eth");
    }

    #[test]
    fn test_not_owner_display() {
        let err = WalletError::NotOwner {
            caller: Address::new(),
        };
        assert_eq!(err.to_string(), "Ownable: caller is not the owner");
    }

    #[test]
    fn test_factory_error_surfaces_registry_verbatim() {
        let registry_err = RegistryError::NameAlreadyUsed {
            name: Name::encode("addr1.eth").unwrap(),
        };
        let factory_err: FactoryError = registry_err.clone().into();
        assert_eq!(factory_err.to_string(), registry_err.to_string());
    }

    #[test]
    fn test_runtime_error_predicates() {
        let name = Name::encode("alice").unwrap();
        let via_factory: RuntimeError =
            FactoryError::from(RegistryError::NameAlreadyUsed { name }).into();
        assert!(via_factory.is_name_already_used());
        assert_eq!(via_factory.kind(), "name_already_used");

        let transfer: RuntimeError = WalletError::TransferFailed(LedgerError::Overflow).into();
        assert!(transfer.is_transfer_failed());
        assert!(!transfer.is_not_owner());
    }

    #[test]
    fn test_insufficient_balance_display() {
        let err = LedgerError::InsufficientBalance {
            token: TokenId::derive("COIN", &Address::ZERO),
            required: Amount::from_u64(15),
            available: Amount::from_u64(5),
        };
        assert!(err.to_string().contains("15"));
        assert!(err.to_string().contains("available 5"));
    }
}
