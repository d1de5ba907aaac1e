use bytes::Bytes;

use crate::types::primitive::{Address, Hash};
use crate::types::Balance;

/// EIP-2718 transaction type tags.
pub const LEGACY_TX_TYPE: u8 = 0x00;
pub const ACCESS_LIST_TX_TYPE: u8 = 0x01;
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x02;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessTuple {
    pub address:      Address,
    pub storage_keys: Vec<Hash>,
}

/// A transaction as carried inside an event body. `v`, `r` and `s` are the
/// raw signature values; `r` and `s` must fit 32 bytes each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    Legacy {
        nonce:     u64,
        gas_price: Balance,
        gas:       u64,
        to:        Option<Address>,
        value:     Balance,
        data:      Bytes,
        v:         Balance,
        r:         Balance,
        s:         Balance,
    },
    AccessList {
        chain_id:    Balance,
        nonce:       u64,
        gas_price:   Balance,
        gas:         u64,
        to:          Option<Address>,
        value:       Balance,
        data:        Bytes,
        access_list: Vec<AccessTuple>,
        v:           Balance,
        r:           Balance,
        s:           Balance,
    },
    DynamicFee {
        chain_id:    Balance,
        nonce:       u64,
        gas_tip_cap: Balance,
        gas_fee_cap: Balance,
        gas:         u64,
        to:          Option<Address>,
        value:       Balance,
        data:        Bytes,
        access_list: Vec<AccessTuple>,
        v:           Balance,
        r:           Balance,
        s:           Balance,
    },
}

impl Transaction {
    pub fn tx_type(&self) -> u8 {
        match self {
            Transaction::Legacy { .. } => LEGACY_TX_TYPE,
            Transaction::AccessList { .. } => ACCESS_LIST_TX_TYPE,
            Transaction::DynamicFee { .. } => DYNAMIC_FEE_TX_TYPE,
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy { nonce, .. }
            | Transaction::AccessList { nonce, .. }
            | Transaction::DynamicFee { nonce, .. } => *nonce,
        }
    }

    pub fn gas(&self) -> u64 {
        match self {
            Transaction::Legacy { gas, .. }
            | Transaction::AccessList { gas, .. }
            | Transaction::DynamicFee { gas, .. } => *gas,
        }
    }

    pub fn to(&self) -> Option<&Address> {
        match self {
            Transaction::Legacy { to, .. }
            | Transaction::AccessList { to, .. }
            | Transaction::DynamicFee { to, .. } => to.as_ref(),
        }
    }

    pub fn value(&self) -> &Balance {
        match self {
            Transaction::Legacy { value, .. }
            | Transaction::AccessList { value, .. }
            | Transaction::DynamicFee { value, .. } => value,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Transaction::Legacy { data, .. }
            | Transaction::AccessList { data, .. }
            | Transaction::DynamicFee { data, .. } => data,
        }
    }

    pub fn sig_values(&self) -> (&Balance, &Balance, &Balance) {
        match self {
            Transaction::Legacy { v, r, s, .. }
            | Transaction::AccessList { v, r, s, .. }
            | Transaction::DynamicFee { v, r, s, .. } => (v, r, s),
        }
    }

    /// The chain id and access list of the typed variants.
    pub fn typed_fields(&self) -> Option<(&Balance, &[AccessTuple])> {
        match self {
            Transaction::Legacy { .. } => None,
            Transaction::AccessList {
                chain_id,
                access_list,
                ..
            }
            | Transaction::DynamicFee {
                chain_id,
                access_list,
                ..
            } => Some((chain_id, access_list)),
        }
    }

    /// Digest of the rlp form, used for payload hashing and tx lookup.
    pub fn hash(&self) -> Hash {
        Hash::digest(rlp::encode(self))
    }
}
