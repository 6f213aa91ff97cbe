//! Contract events
//!
//! Events are immutable records emitted by successful operations. They are
//! staged with the rest of an operation's writes, so a reverted operation
//! never emits anything.

use serde::{Deserialize, Serialize};
use types::ids::{Address, Name, TokenId};
use types::numeric::Amount;

use crate::journal::{StagedLog, Transactional};

/// A name was bound in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameReserved {
    pub name: Name,
    pub account: Address,
}

/// A wallet was provisioned for a freshly claimed name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCreated {
    pub name: Name,
    pub wallet: Address,
    pub owner: Address,
}

/// Tokens moved between two ledger accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub token: TokenId,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    NameReserved(NameReserved),
    WalletCreated(WalletCreated),
    Transfer(Transfer),
}

impl ContractEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NameReserved(_) => "NameReserved",
            Self::WalletCreated(_) => "WalletCreated",
            Self::Transfer(_) => "Transfer",
        }
    }
}

impl From<NameReserved> for ContractEvent {
    fn from(event: NameReserved) -> Self {
        Self::NameReserved(event)
    }
}

impl From<WalletCreated> for ContractEvent {
    fn from(event: WalletCreated) -> Self {
        Self::WalletCreated(event)
    }
}

impl From<Transfer> for ContractEvent {
    fn from(event: Transfer) -> Self {
        Self::Transfer(event)
    }
}

/// An event with its position in the global event order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: ContractEvent,
}

/// Sequenced event log (append-only)
#[derive(Debug, Default)]
pub struct EventLog {
    log: StagedLog<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an event. Returns its sequence number.
    pub fn emit(&mut self, event: impl Into<ContractEvent>) -> u64 {
        let sequence = self.log.next_sequence();
        self.log.append(EventRecord {
            sequence,
            event: event.into(),
        })
    }

    /// Committed events in sequence order.
    pub fn records(&self) -> &[EventRecord] {
        self.log.committed()
    }

    /// Drain all committed events (consume and clear).
    pub fn drain(&mut self) -> Vec<EventRecord> {
        self.log.drain_committed()
    }
}

impl Transactional for EventLog {
    fn commit(&mut self) {
        self.log.commit();
    }

    fn rollback(&mut self) {
        self.log.rollback();
    }

    fn has_pending(&self) -> bool {
        self.log.has_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet_created() -> WalletCreated {
        WalletCreated {
            name: Name::encode("addr1.eth").unwrap(),
            wallet: Address::new(),
            owner: Address::new(),
        }
    }

    #[test]
    fn test_wallet_created_serialization() {
        let event = wallet_created();
        let json = serde_json::to_string(&event).unwrap();
        let deser: WalletCreated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_contract_event_label() {
        let event: ContractEvent = wallet_created().into();
        assert!(matches!(event, ContractEvent::WalletCreated(_)));
        assert_eq!(event.label(), "WalletCreated");
    }

    #[test]
    fn test_event_log_commit_and_sequence() {
        let mut log = EventLog::new();
        assert_eq!(log.emit(wallet_created()), 0);
        assert!(log.records().is_empty(), "Staged events are not visible");
        log.commit();
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].sequence, 0);
    }

    #[test]
    fn test_event_log_rollback_emits_nothing() {
        let mut log = EventLog::new();
        log.emit(wallet_created());
        log.rollback();
        log.commit();
        assert!(log.records().is_empty());
        assert_eq!(log.emit(wallet_created()), 0);
    }

    #[test]
    fn test_event_log_drain() {
        let mut log = EventLog::new();
        log.emit(wallet_created());
        log.commit();

        let events = log.drain();
        assert_eq!(events.len(), 1);
        assert!(log.records().is_empty());
        assert_eq!(log.emit(wallet_created()), 1);
    }
}
