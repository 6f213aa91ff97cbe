//! Identifier types for registry and wallet entities
//!
//! Addresses are 20-byte account identifiers, names are 32-byte fixed-width
//! opaque keys, and tokens are addressed by the address of their ledger.
//! All three render and serialize as `0x`-prefixed lower-case hex.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ParseError;

/// Byte width of an [`Address`].
pub const ADDRESS_LEN: usize = 20;

/// Byte width of a [`Name`].
pub const NAME_LEN: usize = 32;

/// Longest human-readable name accepted by [`Name::encode`].
///
/// One byte of the fixed-width encoding is always left as a zero terminator.
pub const MAX_NAME_BYTES: usize = NAME_LEN - 1;

fn decode_hex<const N: usize>(input: &str) -> Result<[u8; N], ParseError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ParseError::InvalidLength { expected: N, got })
}

/// Account identifier
///
/// `Address::ZERO` is the "no owner" sentinel returned by registry lookups
/// for unbound names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create a fresh, unique address seeded from a UUID v7.
    pub fn new() -> Self {
        Self::derive(b"account", &[Uuid::now_v7().as_bytes()])
    }

    /// Derive an address deterministically from a domain tag and parts.
    ///
    /// The address is the first 20 bytes of
    /// `SHA-256(domain || len(part) || part || ...)`. Parts are length
    /// prefixed so distinct part lists never collide by concatenation.
    pub fn derive(domain: &[u8], parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Parse a hex address, with or without the `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, ParseError> {
        decode_hex(input).map(Self)
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Fixed-width registry key
///
/// Names are compared by exact byte equality and never interpreted by the
/// registry. [`Name::encode`] packs a human-readable string the same way
/// client tooling does: UTF-8 bytes, zero padded to 32 bytes.
///
/// Text input (`FromStr`, serde) accepts either form: the 64-digit hex
/// encoding, with or without `0x`, or a plain name of at most 31 bytes.
/// The two cannot collide since hex input is always longer than 31 bytes.
/// Serialization always writes the hex form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name([u8; NAME_LEN]);

impl Name {
    /// Encode a human-readable string into its fixed-width form.
    pub fn encode(text: &str) -> Result<Self, ParseError> {
        let raw = text.as_bytes();
        if raw.len() > MAX_NAME_BYTES {
            return Err(ParseError::NameTooLong {
                len: raw.len(),
                max: MAX_NAME_BYTES,
            });
        }
        let mut bytes = [0u8; NAME_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; NAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.0
    }

    /// Parse the 32-byte hex form, with or without the `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, ParseError> {
        decode_hex(input).map(Self)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse either the hex form or a plain name.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.len() == NAME_LEN * 2 {
            Self::from_hex(input)
        } else {
            Self::encode(input)
        }
    }

    /// Best-effort human-readable form, for logs and presentation only.
    ///
    /// Returns `None` when the bytes before the zero padding are not UTF-8.
    pub fn decode(&self) -> Option<&str> {
        let end = self.0.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        std::str::from_utf8(&self.0[..end]).ok()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Some(text) => f.write_str(text),
            None => f.write_str(&self.to_hex()),
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.to_string())
    }
}

impl FromStr for Name {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.to_hex()
    }
}

/// Token identifier (the address of the token's ledger)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Address);

impl TokenId {
    pub fn from_address(address: Address) -> Self {
        Self(address)
    }

    /// Derive the id of a token issued under `symbol` by `issuer`.
    pub fn derive(symbol: &str, issuer: &Address) -> Self {
        Self(Address::derive(b"token", &[symbol.as_bytes(), issuer.as_bytes()]))
    }

    pub fn as_address(&self) -> &Address {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
