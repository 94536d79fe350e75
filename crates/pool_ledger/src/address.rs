//! Identities, asset sides and swap directions

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 32-byte identity of an account, an asset, or the pool itself
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address(pub [u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("empty address")]
    Empty,
    #[error("label `{0}` is longer than 32 bytes")]
    LabelTooLong(String),
}

impl Address {
    /// The null identity
    pub const ZERO: Address = Address([0u8; 32]);

    /// Derive a readable fixture identity from a short label
    ///
    /// The label bytes are stored left-aligned and zero padded, so the
    /// label survives a `Display` round trip.
    pub fn from_label(label: &str) -> Result<Self, AddressParseError> {
        let bytes = label.as_bytes();
        if bytes.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if bytes.len() > 32 {
            return Err(AddressParseError::LabelTooLong(label.to_string()));
        }
        let mut raw = [0u8; 32];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Address(raw))
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The label this address was derived from, if any
    pub fn label(&self) -> Option<&str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(32);
        if end == 0 || self.0[end..].iter().any(|b| *b != 0) {
            return None;
        }
        let text = core::str::from_utf8(&self.0[..end]).ok()?;
        text.chars().all(|c| c.is_ascii_graphic()).then_some(text)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => f.write_str(&bs58::encode(self.0).into_string()),
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Base58 encodings of exactly 32 bytes are taken verbatim; anything
    /// else is treated as a label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(decoded) = bs58::decode(s).into_vec() {
            if let Ok(raw) = <[u8; 32]>::try_from(decoded.as_slice()) {
                return Ok(Address(raw));
            }
        }
        Address::from_label(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One side of the asset pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AToB,
    BToA,
}

impl Direction {
    /// Side whose reserve receives the input
    pub fn input(self) -> Side {
        match self {
            Direction::AToB => Side::A,
            Direction::BToA => Side::B,
        }
    }

    /// Side whose reserve pays the output
    pub fn output(self) -> Side {
        self.input().other()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Side {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Side::A),
            "b" => Ok(Side::B),
            _ => Err(ParseEnumError { kind: "side", value: s.to_string() }),
        }
    }
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "a_to_b" | "ab" => Ok(Direction::AToB),
            "b_to_a" | "ba" => Ok(Direction::BToA),
            _ => Err(ParseEnumError { kind: "direction", value: s.to_string() }),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::AToB => f.write_str("A->B"),
            Direction::BToA => f.write_str("B->A"),
        }
    }
}
