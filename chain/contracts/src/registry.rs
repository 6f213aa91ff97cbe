//! Name registry — global first-come-first-registered name table
//!
//! Maps fixed-width [`Name`]s to account addresses. A binding, once made,
//! is permanent: there is no re-registration, transfer or deletion path.
//! Only the bound writer (the wallet factory) may reserve names; lookups
//! are open to everyone.

use tracing::{debug, info, warn};
use types::ids::{Address, Name};

use crate::errors::RegistryError;
use crate::events::NameReserved;
use crate::journal::{StagedMap, Transactional};
use crate::security::{WriterAuthority, WriterCheck};

/// The name -> account table.
#[derive(Debug)]
pub struct NameRegistry {
    bindings: StagedMap<Name, Address>,
    authority: WriterAuthority,
}

impl NameRegistry {
    /// Create a registry whose writer is bound later by `admin`.
    pub fn new(admin: Address) -> Self {
        Self {
            bindings: StagedMap::new(),
            authority: WriterAuthority::new(admin),
        }
    }

    /// Create a registry with its writer bound at construction.
    pub fn with_writer(admin: Address, writer: Address) -> Self {
        Self {
            bindings: StagedMap::new(),
            authority: WriterAuthority::with_writer(admin, writer),
        }
    }

    // ───────────────────────── Writer binding ─────────────────────────

    /// Bind the single authorized writer. Admin-only, once.
    pub fn bind_writer(&mut self, caller: &Address, writer: Address) -> Result<(), RegistryError> {
        if !self.authority.is_admin(caller) {
            return Err(RegistryError::Unauthorized { caller: *caller });
        }
        self.authority
            .bind(writer)
            .map_err(|existing| RegistryError::WriterAlreadyBound { writer: existing })?;
        info!(%writer, "Registry writer bound");
        Ok(())
    }

    pub fn writer(&self) -> Option<&Address> {
        self.authority.writer()
    }

    pub fn admin(&self) -> &Address {
        self.authority.admin()
    }

    // ───────────────────────── Reservation ─────────────────────────

    /// Bind `name` to `account` if and only if `name` is unbound.
    ///
    /// The availability check and the write happen in the same call with
    /// nothing in between; on any error no state is touched.
    pub fn reserve(
        &mut self,
        caller: &Address,
        name: Name,
        account: Address,
    ) -> Result<NameReserved, RegistryError> {
        match self.authority.check(caller) {
            WriterCheck::Allowed => {}
            WriterCheck::Denied => {
                warn!(%caller, %name, "Rejected reservation from unauthorized caller");
                return Err(RegistryError::Unauthorized { caller: *caller });
            }
            WriterCheck::Unbound => return Err(RegistryError::WriterNotBound),
        }

        if account.is_zero() {
            return Err(RegistryError::ZeroAccount);
        }

        if self.bindings.contains_key(&name) {
            return Err(RegistryError::NameAlreadyUsed { name });
        }

        self.bindings.insert(name, account);
        debug!(%name, %account, "Name reserved");
        Ok(NameReserved { name, account })
    }

    // ───────────────────────── Lookups ─────────────────────────

    /// Bound account, or [`Address::ZERO`] if the name is unbound.
    pub fn resolve(&self, name: &Name) -> Address {
        self.lookup(name).unwrap_or(Address::ZERO)
    }

    pub fn lookup(&self, name: &Name) -> Option<Address> {
        self.bindings.get(name).copied()
    }

    pub fn is_available(&self, name: &Name) -> bool {
        self.resolve(name).is_zero()
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Committed bindings, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&Name, &Address)> {
        self.bindings.iter_committed()
    }
}

impl Transactional for NameRegistry {
    fn commit(&mut self) {
        self.bindings.commit();
    }

    fn rollback(&mut self) {
        self.bindings.rollback();
    }

    fn has_pending(&self) -> bool {
        self.bindings.has_pending()
    }
}
