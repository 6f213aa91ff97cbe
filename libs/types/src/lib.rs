//! Types library for named custodial wallets
//!
//! Core identifier and amount types shared by the registry, the wallet
//! factory, the wallets and the token ledgers.
//!
//! # Modules
//! - `ids`: Identifiers (Address, Name, TokenId)
//! - `numeric`: Non-negative fixed-point amounts
//! - `errors`: Parse error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
