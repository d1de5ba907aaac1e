use std::fmt;

use bytes::Bytes;
use hasher::{Hasher, HasherKeccak};
use lazy_static::lazy_static;

use crate::types::TypesError;
use crate::ProtocolResult;

lazy_static! {
    static ref HASHER_INST: HasherKeccak = HasherKeccak::new();
}

/// Hash length
pub const HASH_LEN: usize = 32;
/// Address length
pub const ADDRESS_LEN: usize = 20;
/// Signature length: a 64-byte compact signature plus one recovery byte.
pub const SIGNATURE_LEN: usize = 65;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    /// Enter an array of bytes to get a 32-byte keccak hash.
    pub fn digest<B: AsRef<[u8]>>(bytes: B) -> Self {
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&HASHER_INST.digest(bytes.as_ref()));

        Self(out)
    }

    /// Digest of the concatenation of two hashes. The payload hash tree is
    /// built from this.
    pub fn merge(left: &Hash, right: &Hash) -> Hash {
        let mut root = Vec::with_capacity(2 * HASH_LEN);
        root.extend_from_slice(&left.0);
        root.extend_from_slice(&right.0);
        Hash::digest(root)
    }

    /// Converts the byte array to a Hash type.
    /// Note: if you want to compute the hash value of the byte array, you
    /// should call `fn digest`.
    pub fn from_bytes(bytes: Bytes) -> ProtocolResult<Self> {
        ensure_len(bytes.len(), HASH_LEN)?;

        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    pub fn from_hex(s: &str) -> ProtocolResult<Self> {
        let s = clean_0x(s);
        let bytes = hex::decode(s).map_err(TypesError::from)?;

        Self::from_bytes(Bytes::from(bytes))
    }

    pub fn as_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn into_fixed_bytes(self) -> [u8; HASH_LEN] {
        self.0
    }
}

impl From<[u8; HASH_LEN]> for Hash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

/// A 20-byte account or contract address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn from_bytes(bytes: Bytes) -> ProtocolResult<Self> {
        ensure_len(bytes.len(), ADDRESS_LEN)?;

        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    pub fn from_hex(s: &str) -> ProtocolResult<Self> {
        let s = clean_0x(s);
        let bytes = hex::decode(s).map_err(TypesError::from)?;

        Self::from_bytes(Bytes::from(bytes))
    }

    pub fn as_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

/// The event signature as carried on the wire.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_bytes(bytes: Bytes) -> ProtocolResult<Self> {
        ensure_len(bytes.len(), SIGNATURE_LEN)?;

        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// The compact (r, s) part without the recovery byte.
    pub fn compact(&self) -> &[u8] {
        &self.0[..SIGNATURE_LEN - 1]
    }

    pub fn as_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature([0u8; SIGNATURE_LEN])
    }
}

impl From<[u8; SIGNATURE_LEN]> for Signature {
    fn from(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

fn clean_0x(s: &str) -> &str {
    if let Some(stripped) = s.strip_prefix("0x") {
        stripped
    } else {
        s
    }
}

fn ensure_len(real: usize, expect: usize) -> ProtocolResult<()> {
    if real != expect {
        Err(TypesError::LengthMismatch { expect, real }.into())
    } else {
        Ok(())
    }
}
