use bytes::Bytes;

use crate::codec::{CodecError, ProtocolCser, PROTOCOL_MAX_MSG_SIZE};
use crate::cser::{padded_bytes, CserError, Reader, Writer};
use crate::types::primitive::{Address, Hash, ADDRESS_LEN, HASH_LEN};
use crate::types::transaction::{
    AccessTuple, Transaction, ACCESS_LIST_TX_TYPE, DYNAMIC_FEE_TX_TYPE, LEGACY_TX_TYPE,
};
use crate::types::Balance;

// Transactions ride inside event bodies in the same split-stream format.
// The type tag is a 6-bit marker trick: typed transactions start with six
// zero bits plus an explicit type byte, while a legacy transaction starts
// directly with its nonce and gas words. A legacy gas limit above 0xFF
// guarantees those six bits are never all zero.

const MAX_ACCESS_LIST_LEN: u32 = (PROTOCOL_MAX_MSG_SIZE / 24) as u32;
const MAX_STORAGE_KEYS_LEN: u32 = (PROTOCOL_MAX_MSG_SIZE / 32) as u32;

/// Packs r and s into the fixed 64-byte wire form, 32 bytes each,
/// left-padded.
fn encode_sig(r: &Balance, s: &Balance) -> Result<[u8; 64], CodecError> {
    let r_bytes = r.to_bytes_be();
    let s_bytes = s.to_bytes_be();
    if r_bytes.len() > 32 || s_bytes.len() > 32 {
        return Err(CodecError::MalformedEvent);
    }
    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&padded_bytes(&r_bytes, 32));
    sig[32..].copy_from_slice(&padded_bytes(&s_bytes, 32));
    Ok(sig)
}

fn decode_sig(sig: &[u8; 64]) -> (Balance, Balance) {
    (
        Balance::from_bytes_be(&sig[..32]),
        Balance::from_bytes_be(&sig[32..]),
    )
}

pub(crate) fn marshal_tx(w: &mut Writer, tx: &Transaction) -> Result<(), CodecError> {
    if tx.tx_type() != LEGACY_TX_TYPE {
        // marker: six zero bits, then the explicit type byte
        w.bits.write(6, 0);
        w.write_u8(tx.tx_type());
    } else if tx.gas() <= 0xff {
        return Err(CodecError::LegacyGasTooLow);
    }

    w.write_u64(tx.nonce());
    w.write_u64(tx.gas());

    match tx {
        Transaction::DynamicFee {
            gas_tip_cap,
            gas_fee_cap,
            ..
        } => {
            w.write_big_uint(gas_tip_cap)?;
            w.write_big_uint(gas_fee_cap)?;
        }
        Transaction::Legacy { gas_price, .. } | Transaction::AccessList { gas_price, .. } => {
            w.write_big_uint(gas_price)?;
        }
    }

    w.write_big_uint(tx.value())?;
    match tx.to() {
        Some(to) => {
            w.write_bool(true);
            w.write_fixed_bytes(to.as_ref());
        }
        None => w.write_bool(false),
    }
    w.write_slice_bytes(tx.data())?;

    let (v, r, s) = tx.sig_values();
    w.write_big_uint(v)?;
    let sig = encode_sig(r, s)?;
    w.write_fixed_bytes(&sig);

    if let Some((chain_id, access_list)) = tx.typed_fields() {
        w.write_big_uint(chain_id)?;
        w.write_u32(access_list.len() as u32);
        for tuple in access_list {
            w.write_fixed_bytes(tuple.address.as_ref());
            w.write_u32(tuple.storage_keys.len() as u32);
            for key in &tuple.storage_keys {
                w.write_fixed_bytes(key.as_ref());
            }
        }
    }
    Ok(())
}

pub(crate) fn unmarshal_tx(r: &mut Reader<'_>) -> Result<Transaction, CodecError> {
    let mut tx_type = LEGACY_TX_TYPE;
    if r.bits.view(6)? == 0 {
        r.bits.read(6)?;
        tx_type = r.read_u8()?;
    }

    let nonce = r.read_u64()?;
    let gas = r.read_u64()?;

    let mut gas_price = Balance::default();
    let mut gas_tip_cap = Balance::default();
    let mut gas_fee_cap = Balance::default();
    if tx_type == DYNAMIC_FEE_TX_TYPE {
        gas_tip_cap = r.read_big_uint()?;
        gas_fee_cap = r.read_big_uint()?;
    } else {
        gas_price = r.read_big_uint()?;
    }

    let value = r.read_big_uint()?;
    let to = if r.read_bool()? {
        let mut addr = [0u8; ADDRESS_LEN];
        r.read_fixed_bytes(&mut addr)?;
        Some(Address::from(addr))
    } else {
        None
    };
    let data = Bytes::from(r.read_slice_bytes(PROTOCOL_MAX_MSG_SIZE)?);

    let v = r.read_big_uint()?;
    let mut sig = [0u8; 64];
    r.read_fixed_bytes(&mut sig)?;
    let (sig_r, sig_s) = decode_sig(&sig);

    if tx_type == LEGACY_TX_TYPE {
        return Ok(Transaction::Legacy {
            nonce,
            gas_price,
            gas,
            to,
            value,
            data,
            v,
            r: sig_r,
            s: sig_s,
        });
    }
    if tx_type != ACCESS_LIST_TX_TYPE && tx_type != DYNAMIC_FEE_TX_TYPE {
        return Err(CodecError::UnknownTxType(tx_type));
    }

    let chain_id = r.read_big_uint()?;
    let access_list_len = r.read_u32()?;
    if access_list_len > MAX_ACCESS_LIST_LEN {
        return Err(CserError::TooLargeAlloc.into());
    }
    let mut access_list = Vec::with_capacity(access_list_len as usize);
    for _ in 0..access_list_len {
        let mut addr = [0u8; ADDRESS_LEN];
        r.read_fixed_bytes(&mut addr)?;
        let keys_len = r.read_u32()?;
        if keys_len > MAX_STORAGE_KEYS_LEN {
            return Err(CserError::TooLargeAlloc.into());
        }
        let mut storage_keys = Vec::with_capacity(keys_len as usize);
        for _ in 0..keys_len {
            let mut key = [0u8; HASH_LEN];
            r.read_fixed_bytes(&mut key)?;
            storage_keys.push(Hash::from(key));
        }
        access_list.push(AccessTuple {
            address: Address::from(addr),
            storage_keys,
        });
    }

    if tx_type == ACCESS_LIST_TX_TYPE {
        Ok(Transaction::AccessList {
            chain_id,
            nonce,
            gas_price,
            gas,
            to,
            value,
            data,
            access_list,
            v,
            r: sig_r,
            s: sig_s,
        })
    } else {
        Ok(Transaction::DynamicFee {
            chain_id,
            nonce,
            gas_tip_cap,
            gas_fee_cap,
            gas,
            to,
            value,
            data,
            access_list,
            v,
            r: sig_r,
            s: sig_s,
        })
    }
}

impl ProtocolCser for Transaction {
    fn marshal_cser(&self, w: &mut Writer) -> Result<(), CodecError> {
        marshal_tx(w, self)
    }

    fn unmarshal_cser(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        unmarshal_tx(r)
    }
}
