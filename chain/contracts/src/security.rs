//! Shared access-control primitives
//!
//! Caller identity is always passed in explicitly; these guards only
//! compare it against the identity recorded at construction.

use serde::{Deserialize, Serialize};
use types::ids::Address;

/// Single immutable owner.
///
/// Set once when the guarded object is created; there is no transfer or
/// renounce path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Check if a caller is the owner.
    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }
}

/// Result of checking a caller against a [`WriterAuthority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterCheck {
    /// Caller is the bound writer
    Allowed,
    /// A writer is bound and it is someone else
    Denied,
    /// No writer has been bound yet
    Unbound,
}

/// Capability guard for a shared table with exactly one authorized writer.
///
/// The `admin` may bind the writer once; after that the binding is
/// permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterAuthority {
    admin: Address,
    writer: Option<Address>,
}

impl WriterAuthority {
    /// Create an authority with no writer bound.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            writer: None,
        }
    }

    /// Create an authority with the writer bound at construction.
    pub fn with_writer(admin: Address, writer: Address) -> Self {
        Self {
            admin,
            writer: Some(writer),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn writer(&self) -> Option<&Address> {
        self.writer.as_ref()
    }

    pub fn is_admin(&self, caller: &Address) -> bool {
        self.admin == *caller
    }

    /// Bind the writer. Returns the already-bound writer on a second call.
    pub fn bind(&mut self, writer: Address) -> Result<(), Address> {
        match self.writer {
            Some(existing) => Err(existing),
            None => {
                self.writer = Some(writer);
                Ok(())
            }
        }
    }

    pub fn check(&self, caller: &Address) -> WriterCheck {
        match &self.writer {
            None => WriterCheck::Unbound,
            Some(writer) if writer == caller => WriterCheck::Allowed,
            Some(_) => WriterCheck::Denied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Ownable tests ---

    #[test]
    fn test_ownable_owner() {
        let alice = Address::new();
        let bob = Address::new();
        let ownable = Ownable::new(alice);
        assert!(ownable.is_owner(&alice));
        assert!(!ownable.is_owner(&bob));
        assert_eq!(ownable.owner(), &alice);
    }

    // --- WriterAuthority tests ---

    #[test]
    fn test_writer_unbound() {
        let authority = WriterAuthority::new(Address::new());
        assert_eq!(authority.check(&Address::new()), WriterCheck::Unbound);
        assert!(authority.writer().is_none());
    }

    #[test]
    fn test_writer_bind_once() {
        let factory = Address::new();
        let mut authority = WriterAuthority::new(Address::new());
        assert_eq!(authority.bind(factory), Ok(()));
        assert_eq!(authority.bind(Address::new()), Err(factory));
        assert_eq!(authority.writer(), Some(&factory));
    }

    #[test]
    fn test_writer_check() {
        let factory = Address::new();
        let authority = WriterAuthority::with_writer(Address::new(), factory);
        assert_eq!(authority.check(&factory), WriterCheck::Allowed);
        assert_eq!(authority.check(&Address::new()), WriterCheck::Denied);
    }

    #[test]
    fn test_writer_admin() {
        let admin = Address::new();
        let authority = WriterAuthority::new(admin);
        assert!(authority.is_admin(&admin));
        assert!(!authority.is_admin(&Address::new()));
    }
}
