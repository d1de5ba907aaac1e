pub mod codec;
pub mod cser;
pub mod fixed_codec;
pub mod types;

use std::error::Error;

use derive_more::{Constructor, Display};

pub use bytes::{Bytes, BytesMut};

#[derive(Debug, Clone)]
pub enum ProtocolErrorKind {
    // types
    Types,

    // low-level bit/byte streams
    Cser,

    // wire codec
    Codec,

    // rlp sub-format
    FixedCodec,

    // vote packs
    Llr,
}

#[derive(Debug, Constructor, Display)]
#[display(fmt = "[ProtocolError] Kind: {:?} Error: {:?}", kind, error)]
pub struct ProtocolError {
    kind:  ProtocolErrorKind,
    error: Box<dyn Error + Send>,
}

impl ProtocolError {
    pub fn kind(&self) -> &ProtocolErrorKind {
        &self.kind
    }
}

impl From<ProtocolError> for Box<dyn Error + Send> {
    fn from(error: ProtocolError) -> Self {
        Box::new(error) as Box<dyn Error + Send>
    }
}

impl Error for ProtocolError {}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
