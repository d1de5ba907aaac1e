pub mod event;
pub mod transaction;

#[cfg(test)]
mod tests;

use std::error::Error;

use bytes::Bytes;
use derive_more::{Display, From};

use crate::cser::{binary, CserError, Reader, Writer};
use crate::{ProtocolError, ProtocolErrorKind};

/// Hard limit for a network message; every length decoded from the wire is
/// bounded by it before any allocation.
pub const PROTOCOL_MAX_MSG_SIZE: usize = 10 * 1024 * 1024;

/// Highest wire version this node understands.
pub const MAX_SERIALIZATION_VERSION: u8 = 1;

#[derive(Debug, Display, From, PartialEq)]
pub enum CodecError {
    #[display(fmt = "cser: {}", _0)]
    Cser(CserError),

    #[display(fmt = "rlp sub-format: {}", _0)]
    Rlp(rlp::DecoderError),

    #[display(fmt = "serialization of malformed event: structure violates protocol rules")]
    #[from(ignore)]
    MalformedEvent,

    #[display(fmt = "serialization of legacy tx with gas limit <= 255 is unsupported")]
    #[from(ignore)]
    LegacyGasTooLow,

    #[display(fmt = "serialization of events with epoch < 256 and version 0 is unsupported")]
    #[from(ignore)]
    TooLowEpoch,

    #[display(fmt = "unknown serialization version {}: client is likely outdated", _0)]
    #[from(ignore)]
    UnknownVersion(u8),

    #[display(fmt = "unknown tx type {}: supported types are legacy, access-list, dynamic-fee", _0)]
    #[from(ignore)]
    UnknownTxType(u8),
}

impl Error for CodecError {}

impl From<CodecError> for ProtocolError {
    fn from(err: CodecError) -> ProtocolError {
        ProtocolError::new(ProtocolErrorKind::Codec, Box::new(err))
    }
}

/// Serialization into the split-stream wire format. Types implement the two
/// stream halves; the framing entry points come for free.
pub trait ProtocolCser: Sized {
    fn marshal_cser(&self, w: &mut Writer) -> Result<(), CodecError>;

    fn unmarshal_cser(r: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Encodes into a self-delimited blob.
    fn encode(&self) -> Result<Bytes, CodecError> {
        binary::marshal(|w| self.marshal_cser(w))
    }

    /// Decodes a blob produced by `encode`, enforcing full consumption.
    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        binary::unmarshal(raw, Self::unmarshal_cser)
    }
}
