use bytes::Bytes;

use crate::fixed_codec::{FixedCodec, FixedCodecError};
use crate::types::primitive::Address;
use crate::types::transaction::{
    AccessTuple, Transaction, ACCESS_LIST_TX_TYPE, DYNAMIC_FEE_TX_TYPE, LEGACY_TX_TYPE,
};
use crate::types::Balance;
use crate::ProtocolResult;

// The rlp form of a transaction is a single list whose first item is the
// type tag; this keeps the blob self-describing when it travels opaquely
// inside an event body.

fn append_balance(s: &mut rlp::RlpStream, v: &Balance) {
    let bytes = if v.bits() == 0 {
        Vec::new()
    } else {
        v.to_bytes_be()
    };
    s.append(&bytes);
}

fn balance_at(r: &rlp::Rlp, index: usize) -> Result<Balance, rlp::DecoderError> {
    let data = r.at(index)?.data()?;
    if data.first() == Some(&0) {
        return Err(rlp::DecoderError::Custom("leading zero in integer"));
    }
    Ok(Balance::from_bytes_be(data))
}

fn append_recipient(s: &mut rlp::RlpStream, to: Option<&Address>) {
    let bytes = to.map(|a| a.as_ref().to_vec()).unwrap_or_default();
    s.append(&bytes);
}

fn recipient_at(r: &rlp::Rlp, index: usize) -> Result<Option<Address>, rlp::DecoderError> {
    let data = r.at(index)?.data()?;
    if data.is_empty() {
        return Ok(None);
    }
    Address::from_bytes(Bytes::copy_from_slice(data))
        .map(Some)
        .map_err(|_| rlp::DecoderError::Custom("wrong bytes of address"))
}

impl rlp::Encodable for AccessTuple {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list(&self.storage_keys);
    }
}

impl rlp::Decodable for AccessTuple {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(AccessTuple {
            address:      r.val_at(0)?,
            storage_keys: r.list_at(1)?,
        })
    }
}

impl rlp::Encodable for Transaction {
    fn rlp_append(&self, stream: &mut rlp::RlpStream) {
        match self {
            Transaction::Legacy {
                nonce,
                gas_price,
                gas,
                to,
                value,
                data,
                v,
                r,
                s,
            } => {
                stream.begin_list(10);
                stream.append(&LEGACY_TX_TYPE);
                stream.append(nonce);
                append_balance(stream, gas_price);
                stream.append(gas);
                append_recipient(stream, to.as_ref());
                append_balance(stream, value);
                stream.append(&data.to_vec());
                append_balance(stream, v);
                append_balance(stream, r);
                append_balance(stream, s);
            }
            Transaction::AccessList {
                chain_id,
                nonce,
                gas_price,
                gas,
                to,
                value,
                data,
                access_list,
                v,
                r,
                s,
            } => {
                stream.begin_list(12);
                stream.append(&ACCESS_LIST_TX_TYPE);
                append_balance(stream, chain_id);
                stream.append(nonce);
                append_balance(stream, gas_price);
                stream.append(gas);
                append_recipient(stream, to.as_ref());
                append_balance(stream, value);
                stream.append(&data.to_vec());
                stream.append_list(access_list);
                append_balance(stream, v);
                append_balance(stream, r);
                append_balance(stream, s);
            }
            Transaction::DynamicFee {
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
                r,
                s,
            } => {
                stream.begin_list(13);
                stream.append(&DYNAMIC_FEE_TX_TYPE);
                append_balance(stream, chain_id);
                stream.append(nonce);
                append_balance(stream, gas_tip_cap);
                append_balance(stream, gas_fee_cap);
                stream.append(gas);
                append_recipient(stream, to.as_ref());
                append_balance(stream, value);
                stream.append(&data.to_vec());
                stream.append_list(access_list);
                append_balance(stream, v);
                append_balance(stream, r);
                append_balance(stream, s);
            }
        }
    }
}

impl rlp::Decodable for Transaction {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() {
            return Err(rlp::DecoderError::RlpExpectedToBeList);
        }

        let tx_type: u8 = r.val_at(0)?;
        match tx_type {
            LEGACY_TX_TYPE => {
                if r.item_count()? != 10 {
                    return Err(rlp::DecoderError::RlpIncorrectListLen);
                }
                Ok(Transaction::Legacy {
                    nonce:     r.val_at(1)?,
                    gas_price: balance_at(r, 2)?,
                    gas:       r.val_at(3)?,
                    to:        recipient_at(r, 4)?,
                    value:     balance_at(r, 5)?,
                    data:      Bytes::from(r.at(6)?.data()?.to_vec()),
                    v:         balance_at(r, 7)?,
                    r:         balance_at(r, 8)?,
                    s:         balance_at(r, 9)?,
                })
            }
            ACCESS_LIST_TX_TYPE => {
                if r.item_count()? != 12 {
                    return Err(rlp::DecoderError::RlpIncorrectListLen);
                }
                Ok(Transaction::AccessList {
                    chain_id:    balance_at(r, 1)?,
                    nonce:       r.val_at(2)?,
                    gas_price:   balance_at(r, 3)?,
                    gas:         r.val_at(4)?,
                    to:          recipient_at(r, 5)?,
                    value:       balance_at(r, 6)?,
                    data:        Bytes::from(r.at(7)?.data()?.to_vec()),
                    access_list: r.list_at(8)?,
                    v:           balance_at(r, 9)?,
                    r:           balance_at(r, 10)?,
                    s:           balance_at(r, 11)?,
                })
            }
            DYNAMIC_FEE_TX_TYPE => {
                if r.item_count()? != 13 {
                    return Err(rlp::DecoderError::RlpIncorrectListLen);
                }
                Ok(Transaction::DynamicFee {
                    chain_id:    balance_at(r, 1)?,
                    nonce:       r.val_at(2)?,
                    gas_tip_cap: balance_at(r, 3)?,
                    gas_fee_cap: balance_at(r, 4)?,
                    gas:         r.val_at(5)?,
                    to:          recipient_at(r, 6)?,
                    value:       balance_at(r, 7)?,
                    data:        Bytes::from(r.at(8)?.data()?.to_vec()),
                    access_list: r.list_at(9)?,
                    v:           balance_at(r, 10)?,
                    r:           balance_at(r, 11)?,
                    s:           balance_at(r, 12)?,
                })
            }
            _ => Err(rlp::DecoderError::Custom("unknown tx type")),
        }
    }
}

impl_default_fixed_codec_for!(transaction, [Transaction]);

impl FixedCodec for Vec<Transaction> {
    fn encode_fixed(&self) -> ProtocolResult<Bytes> {
        Ok(Bytes::from(
            rlp::encode_list::<Transaction, _>(self).to_vec(),
        ))
    }

    fn decode_fixed(bytes: Bytes) -> ProtocolResult<Self> {
        Ok(rlp::Rlp::new(&bytes)
            .as_list()
            .map_err(FixedCodecError::Decoder)?)
    }
}
