//! Strong types for content addresses
//!
//! A digest in the braid log is the base58 string handed back by the block
//! store when bytes are written. The store owns the hash function; this
//! crate only validates and orders the encoded form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a valid base58 content address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid multihash: {0:?}")]
pub struct InvalidHash(pub String);

/// Base58-encoded digest naming a block in the content-addressed store.
///
/// Digests compare as strings; this string order is the tie-break order
/// used everywhere a deterministic ordering of digests is needed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Multihash(String);

impl Multihash {
    /// Parse a base58 string into a digest.
    pub fn from_base58(s: impl Into<String>) -> Result<Self, InvalidHash> {
        let s = s.into();
        if s.is_empty() || bs58::decode(&s).into_vec().is_err() {
            return Err(InvalidHash(s));
        }
        Ok(Self(s))
    }

    /// Encode raw digest bytes as a base58 content address.
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    /// The digest as its base58 string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multihash({})", self.0)
    }
}

impl AsRef<str> for Multihash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Multihash {
    type Error = InvalidHash;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_base58(s)
    }
}

impl From<Multihash> for String {
    fn from(hash: Multihash) -> String {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_base58() {
        let hash = Multihash::from_base58("QmYyQSo1c1Ym7orWxLYvCrM2EmxFTANf8wXmmE7DWjhx5N").unwrap();
        assert_eq!(hash.as_str(), "QmYyQSo1c1Ym7orWxLYvCrM2EmxFTANf8wXmmE7DWjhx5N");
    }

    #[test]
    fn reject_empty() {
        assert!(Multihash::from_base58("").is_err());
    }

    #[test]
    fn reject_non_base58() {
        // '0', 'O', 'I', 'l' are outside the base58 alphabet
        assert!(Multihash::from_base58("0OIl").is_err());
        assert!(Multihash::from_base58("not a hash!").is_err());
    }

    #[test]
    fn digest_encoding_roundtrip() {
        let hash = Multihash::from_digest(&[0xab; 32]);
        let reparsed = Multihash::from_base58(hash.as_str()).unwrap();
        assert_eq!(hash, reparsed);
    }

    #[test]
    fn orders_as_strings() {
        let a = Multihash::from_base58("1a").unwrap();
        let b = Multihash::from_base58("2a").unwrap();
        assert!(a < b);
        assert_eq!(a.as_str() < b.as_str(), a < b);
    }

    #[test]
    fn serde_roundtrip() {
        let hash = Multihash::from_digest(b"some block");
        let json = serde_json::to_string(&hash).unwrap();
        let back: Multihash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<Multihash>("\"\"").is_err());
        assert!(serde_json::from_str::<Multihash>("\"not base58!\"").is_err());
    }
}
