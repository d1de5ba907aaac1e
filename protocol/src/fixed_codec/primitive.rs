use bytes::Bytes;

use crate::types::primitive::{Address, Hash, Signature};

impl rlp::Encodable for Hash {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.encoder().encode_value(self.as_ref());
    }
}

impl rlp::Decodable for Hash {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        r.decoder().decode_value(|bytes| {
            Hash::from_bytes(Bytes::copy_from_slice(bytes))
                .map_err(|_| rlp::DecoderError::Custom("wrong bytes of hash"))
        })
    }
}

impl rlp::Encodable for Address {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.encoder().encode_value(self.as_ref());
    }
}

impl rlp::Decodable for Address {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        r.decoder().decode_value(|bytes| {
            Address::from_bytes(Bytes::copy_from_slice(bytes))
                .map_err(|_| rlp::DecoderError::Custom("wrong bytes of address"))
        })
    }
}

impl rlp::Encodable for Signature {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.encoder().encode_value(self.as_ref());
    }
}

impl rlp::Decodable for Signature {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        r.decoder().decode_value(|bytes| {
            Signature::from_bytes(Bytes::copy_from_slice(bytes))
                .map_err(|_| rlp::DecoderError::Custom("wrong bytes of signature"))
        })
    }
}
