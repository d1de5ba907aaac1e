#[macro_use]
mod r#macro;
pub mod llr;
pub mod misbehaviour;
pub mod primitive;
pub mod transaction;

use std::error::Error;

use bytes::Bytes;
use derive_more::{Display, From};

use crate::{ProtocolError, ProtocolErrorKind};

// Consistent self-describing serialization using the rlp algorithm. Inside
// the wire format it carries the two opaque payload blobs (the version-1
// transaction list and the misbehaviour proofs); storage layers use it
// directly.

pub trait FixedCodec: Sized {
    fn encode_fixed(&self) -> crate::ProtocolResult<Bytes>;

    fn decode_fixed(bytes: Bytes) -> crate::ProtocolResult<Self>;
}

#[derive(Debug, Display, From)]
pub enum FixedCodecError {
    Decoder(rlp::DecoderError),
}

impl Error for FixedCodecError {}

impl From<FixedCodecError> for ProtocolError {
    fn from(err: FixedCodecError) -> ProtocolError {
        ProtocolError::new(ProtocolErrorKind::FixedCodec, Box::new(err))
    }
}
