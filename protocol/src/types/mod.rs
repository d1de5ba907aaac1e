pub mod event;
pub mod llr;
pub mod misbehaviour;
pub mod primitive;
pub mod transaction;

use std::error::Error;
use std::fmt;

use crate::{ProtocolError, ProtocolErrorKind};

pub use event::{
    empty_payload_hash, Event, EventId, EventLocator, EventPayload, GasPowerLeft,
    SignedEventLocator,
};
pub use llr::{BlockVotes, EpochVote, SignedBlockVotes, SignedEpochVote, VoteError};
pub use misbehaviour::{
    BlockVoteDoublesign, EpochVoteDoublesign, EventsDoublesign, MisbehaviourProof,
    WrongBlockVote, WrongEpochVote, MIN_ACCOMPLICES_FOR_PROOF,
};
pub use primitive::{Address, Hash, Signature};
pub use transaction::{AccessTuple, Transaction};

/// DAG coordinates. Lamport is the event's logical clock value.
pub type Epoch = u32;
pub type Lamport = u32;
pub type Frame = u32;
pub type EventSeq = u32;
pub type ValidatorId = u32;
pub type BlockIndex = u64;
pub type Timestamp = u64;

/// Arbitrary-precision non-negative amount.
pub type Balance = num_bigint::BigUint;

#[derive(Debug)]
pub enum TypesError {
    LengthMismatch { expect: usize, real: usize },
    FromHex { error: hex::FromHexError },
}

impl Error for TypesError {}

impl fmt::Display for TypesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match self {
            TypesError::LengthMismatch { expect, real } => {
                format!("Expect {:?} to get {:?}.", expect, real)
            }
            TypesError::FromHex { error } => format!("{:?}.", error),
        };
        write!(f, "{}", printable)
    }
}

impl From<TypesError> for ProtocolError {
    fn from(error: TypesError) -> ProtocolError {
        ProtocolError::new(ProtocolErrorKind::Types, Box::new(error))
    }
}

impl From<hex::FromHexError> for TypesError {
    fn from(error: hex::FromHexError) -> Self {
        TypesError::FromHex { error }
    }
}
